pub mod api;
pub mod export;
pub mod gateway;
pub mod geocoding;
pub mod notifications;
pub mod routing;
