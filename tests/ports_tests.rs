use tagger_port_rs::ports::{PortRange, DEFAULT_PORT, MAX_PORT};

#[test]
fn default_range_scans_ascending_from_default() {
    let ports: Vec<u16> = PortRange::default().iter().collect();
    assert_eq!(ports.first(), Some(&DEFAULT_PORT));
    assert_eq!(ports.last(), Some(&MAX_PORT));
    assert!(ports.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ports.len(), 11);
}

#[test]
fn range_parses_from_cli_text() {
    let r: PortRange = "8000-8003".parse().expect("parse ok");
    assert!(r.contains(8003));
    assert!(!r.contains(8004));
    assert_eq!(r.to_string(), "8000-8003");
}

#[test]
fn invalid_range_rejected() {
    assert!("8003-8000".parse::<PortRange>().is_err());
    assert!("0-10".parse::<PortRange>().is_err());
}
