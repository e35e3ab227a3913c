//! Integration tests for host to container routing

mod event_adapters;
mod routing_scenarios;
mod self_redirect;
mod test_utils;
