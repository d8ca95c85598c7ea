//! Stamps the build date and time used by `core::version::header_comment`.
//!
//! Each stamp can be overridden through its own variable. `SOURCE_DATE_EPOCH`
//! pins both for reproducible builds.

use time::{format_description, OffsetDateTime};

const STAMPS: [(&str, &str); 2] = [
    ("XMODEL_BUILD_DATE", "[month repr:long] [day padding:none], [year]"),
    ("XMODEL_BUILD_TIME", "[hour]:[minute]:[second]"),
];

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    let at = build_time();

    for (var, pattern) in STAMPS {
        println!("cargo:rerun-if-env-changed={}", var);
        let value = std::env::var(var).unwrap_or_else(|_| stamp(at, pattern));
        println!("cargo:rustc-env={}={}", var, value);
    }
}

fn build_time() -> OffsetDateTime {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

fn stamp(at: OffsetDateTime, pattern: &str) -> String {
    format_description::parse(pattern)
        .ok()
        .and_then(|items| at.format(&items).ok())
        .unwrap_or_else(|| "unknown".to_string())
}
