use super::*;

#[test]
fn bench_reports_hash_rate() {
    let output = CommandBuilder::new("bench 1000").run_and_deserialize_output::<Value>();

    pretty_assert_eq!(output["iterations"], 1000);
    assert!(output["seconds"].as_f64().unwrap() >= 0.0);
    assert!(output.get("hash_rate").is_some());
}

#[test]
fn stratum_requires_host() {
    let stderr = CommandBuilder::new("stratum")
        .expected_exit_code(1)
        .run_and_extract_stderr();

    assert!(stderr.contains("error: no stratum host given"), "{stderr}");
}

#[test]
fn solo_requires_username() {
    let stderr = CommandBuilder::new("solo 127.0.0.1 8332")
        .expected_exit_code(1)
        .run_and_extract_stderr();

    assert!(stderr.contains("no RPC username given"), "{stderr}");
}

#[test]
fn stratum_gives_up_on_unreachable_pool() {
    let port = closed_port();

    let stderr = CommandBuilder::new(format!(
        "stratum 127.0.0.1 {port} user --max-reconnects 0 --reconnect-delay 0"
    ))
    .expected_exit_code(1)
    .run_and_extract_stderr();

    assert!(
        stderr.contains("error: giving up after 1 failed connection attempts"),
        "{stderr}"
    );
}

#[test]
fn stratum_endpoint_from_environment() {
    let port = closed_port();

    let stderr = CommandBuilder::new("stratum --max-reconnects 0 --reconnect-delay 0")
        .env("COINMINER_STRATUM_HOST", "127.0.0.1")
        .env("COINMINER_STRATUM_PORT", &port.to_string())
        .env("COINMINER_STRATUM_USERNAME", "user")
        .expected_exit_code(1)
        .run_and_extract_stderr();

    assert!(stderr.contains("giving up after 1 failed"), "{stderr}");
}

#[test]
fn stratum_endpoint_from_config_file() {
    let port = closed_port();

    let stderr = CommandBuilder::new("--config miner.toml stratum")
        .write(
            "miner.toml",
            &format!(
                "[stratum]\nhost = \"127.0.0.1\"\nport = {port}\nusername = \"user\"\nmax_reconnects = 1\nreconnect_delay = 0\n"
            ),
        )
        .expected_exit_code(1)
        .run_and_extract_stderr();

    assert!(stderr.contains("giving up after 2 failed"), "{stderr}");
}

#[test]
fn unknown_config_keys_are_rejected() {
    let stderr = CommandBuilder::new("--config miner.toml bench 1")
        .write("miner.toml", "[stratum]\nhots = \"127.0.0.1\"\n")
        .expected_exit_code(1)
        .run_and_extract_stderr();

    assert!(stderr.contains("hots"), "{stderr}");
}

#[test]
fn invalid_port_is_a_usage_error() {
    CommandBuilder::new("stratum 127.0.0.1 http user")
        .expected_exit_code(2)
        .run();
}
