//! Where the session manager tells the UI to go.

/// Views the session lifecycle can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
}

pub trait NavigationSink: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<F> NavigationSink for F
where
    F: Fn(Route) + Send + Sync,
{
    fn navigate(&self, route: Route) {
        self(route);
    }
}
