//! Deep links into the Jumper swap page

use dashboard_core::{ChainId, TokenAddress};

use crate::constants::{JUMPER_NATIVE_SYMBOL, JUMPER_SWAP_URL};

/// Link that opens the same swap on jumper.exchange.
///
/// `amount` is the human-readable amount exactly as the user typed it; empty
/// reads as `0`. Only a native source token is written as its symbol, the
/// destination token is always passed as an address.
pub fn jumper_swap_url(
    from_token: &TokenAddress,
    from_chain: ChainId,
    to_token: &TokenAddress,
    to_chain: ChainId,
    amount: &str,
) -> String {
    let from = if from_token.is_native() {
        JUMPER_NATIVE_SYMBOL
    } else {
        from_token.as_str()
    };
    let amount = if amount.is_empty() { "0" } else { amount };
    let base = format!(
        "{}/{}:{}-{}:{}",
        JUMPER_SWAP_URL,
        from,
        from_chain,
        to_token.as_str(),
        to_chain
    );

    match reqwest::Url::parse_with_params(&base, &[("fromAmount", amount)]) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("Could not build Jumper link: {}", e);
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::constants::USDC_POLYGON;

    #[test]
    fn test_native_token_uses_symbol() {
        let url = jumper_swap_url(
            &TokenAddress::native(),
            1,
            &TokenAddress::new(USDC_POLYGON),
            137,
            "0.1",
        );
        assert_eq!(
            url,
            "https://jumper.exchange/swap/ETH:1-0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174:137?fromAmount=0.1"
        );
    }

    #[test]
    fn test_native_destination_stays_an_address() {
        let url = jumper_swap_url(
            &TokenAddress::new(USDC_POLYGON),
            137,
            &TokenAddress::native(),
            1,
            "5",
        );
        assert_eq!(
            url,
            "https://jumper.exchange/swap/0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174:137-0x0000000000000000000000000000000000000000:1?fromAmount=5"
        );
    }

    #[test]
    fn test_amount_is_query_encoded() {
        let url = jumper_swap_url(&TokenAddress::native(), 1, &TokenAddress::native(), 10, "1&x=2");
        assert!(url.ends_with("?fromAmount=1%26x%3D2"));

        let url = jumper_swap_url(&TokenAddress::native(), 1, &TokenAddress::native(), 10, "");
        assert!(url.ends_with("?fromAmount=0"));
    }
}
