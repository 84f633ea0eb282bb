//! Integration tests against a mock Canvas server

mod mock_server;
mod resources;
mod upload;
