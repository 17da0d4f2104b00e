#![allow(dead_code)]

use std::sync::Arc;

use chalice_common::ChaliceConfig;
use chalice_mcp::DiscoveryClient;
use chalice_servers::default_client;

pub fn client() -> Arc<DiscoveryClient> {
    default_client(&ChaliceConfig::default())
}

pub fn has_program(name: &str) -> bool {
    std::process::Command::new(name)
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok()
}
