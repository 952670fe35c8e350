/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const AUTH_ROUTE_COMPONENT: &str = "auth";
pub const AUTH_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", AUTH_ROUTE_COMPONENT);

pub const USERS_ROUTE_COMPONENT: &str = "users";
pub const USERS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", USERS_ROUTE_COMPONENT);

pub const MEETINGS_ROUTE_COMPONENT: &str = "meetings";
pub const MEETINGS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", MEETINGS_ROUTE_COMPONENT);
