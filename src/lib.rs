pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;

pub mod models {
    pub mod notification;
    pub mod session;
    pub mod user;
    pub mod wallet;
}

pub mod services {
    pub mod gateway;
    pub mod verifier;
}

pub mod handlers {
    pub mod auth;
    pub mod notifications;
    pub mod pages;
    pub mod wallets;
}

pub mod middleware_layer {
    pub mod guard;
}

pub mod validation {
    pub mod auth;
}
