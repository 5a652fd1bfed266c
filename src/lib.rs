// Configuration (TOML file + environment overrides)
pub mod config;

// Pixel budget economy
pub mod economy;

// Authoritative canvas state and color model
pub mod canvas;

// Connected participants
pub mod presence;

// Chat and canvas event fan-out
pub mod bus;

// Session gateway, wire protocol and connection handling
pub mod gateway;

// HTTP and WebSocket APIs
pub mod api;
