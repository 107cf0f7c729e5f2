use wlts_trajectory::TrajectoryService;

pub struct AppState {
    pub service: TrajectoryService,
    pub version: &'static str,
    /// Read caller roles from the roles header; off means every caller is anonymous
    pub trust_roles_header: bool,
}

impl AppState {
    pub fn new(service: TrajectoryService) -> Self {
        Self { service, version: env!("CARGO_PKG_VERSION"), trust_roles_header: false }
    }

    pub fn with_trusted_roles(mut self, trust: bool) -> Self {
        self.trust_roles_header = trust;
        self
    }
}
