const LISTEN_PORT: &str = "LISTEN_PORT";

pub const DEFAULT_LISTEN_PORT: u16 = 8099;

pub fn get_listen_port() -> Option<u16> {
    std::env::var(LISTEN_PORT)
        .ok()
        .and_then(|port| port.parse().ok())
}

const ENVIRONMENT: &str = "ENVIRONMENT";

pub fn get_environment() -> Option<String> {
    std::env::var(ENVIRONMENT)
        .ok()
        .filter(|environment| !environment.is_empty())
}
