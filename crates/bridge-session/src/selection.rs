//! Fetched routes and the user's choice among them

use dashboard_core::IndexOutOfRange;
use lifi::Route;

#[derive(Debug, Clone, Default)]
pub struct RouteSelection {
    routes: Vec<Route>,
    selected: Option<usize>,
}

impl RouteSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the candidate list; any previous selection is cleared
    pub fn set_routes(&mut self, routes: Vec<Route>) {
        self.routes = routes;
        self.selected = None;
    }

    pub fn select(&mut self, index: usize) -> Result<&Route, IndexOutOfRange> {
        let len = self.routes.len();
        let route = self
            .routes
            .get(index)
            .ok_or(IndexOutOfRange { index, len })?;
        self.selected = Some(index);
        Ok(route)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Route> {
        self.selected.and_then(|i| self.routes.get(i))
    }
}
