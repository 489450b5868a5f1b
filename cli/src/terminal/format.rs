use std::collections::BTreeSet;
use std::net::IpAddr;

use chrono::NaiveDate;
use colored::*;
use ntl_common::models::eol::{EolStatus, ResolvedStatus};
use ntl_common::network::host::{HostProbe, OsGuess};
use ntl_core::diagnostic::CheckStatus;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn address_to_detail(address: &IpAddr) -> Detail {
    let key = match address {
        IpAddr::V4(_) => "IPv4",
        IpAddr::V6(_) => "IPv6",
    };
    (key.to_string(), address.to_string().color(colors::IPV4_ADDR))
}

pub fn ports_to_detail(ports: &BTreeSet<u16>) -> Detail {
    let joined: String = ports
        .iter()
        .map(|port| port.to_string())
        .collect::<Vec<String>>()
        .join(", ");
    ("Ports".to_string(), joined.color(colors::PORT))
}

pub fn os_to_detail(os_guess: Option<OsGuess>) -> Detail {
    let value = match os_guess {
        Some(OsGuess::Unknown) | None => "Unknown".color(colors::STATUS_UNKNOWN),
        Some(guess) => guess.as_str().color(colors::PRIMARY),
    };
    ("OS".to_string(), value)
}

pub fn host_details(host: &HostProbe) -> Vec<Detail> {
    vec![
        address_to_detail(&host.address),
        ports_to_detail(&host.open_ports),
        os_to_detail(host.os_guess),
    ]
}

pub fn status(status: ResolvedStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        ResolvedStatus::Supported => label.color(colors::STATUS_OK),
        ResolvedStatus::EndingSoon => label.color(colors::STATUS_WARN).bold(),
        ResolvedStatus::Obsolete => label.color(colors::STATUS_BAD).bold(),
        ResolvedStatus::Unknown => label.color(colors::STATUS_UNKNOWN),
    }
}

pub fn catalog_status(eol_status: EolStatus) -> ColoredString {
    status(eol_status.into())
}

pub fn check_status(check: CheckStatus) -> ColoredString {
    match check {
        CheckStatus::Ok => "OK".color(colors::STATUS_OK).bold(),
        CheckStatus::Warning => "WARNING".color(colors::STATUS_WARN).bold(),
        CheckStatus::Error => "ERROR".color(colors::STATUS_BAD).bold(),
    }
}

pub fn eol_date(date: Option<NaiveDate>) -> ColoredString {
    match date {
        Some(date) => date.format("%Y-%m-%d").to_string().color(colors::TEXT_DEFAULT),
        None => "N/A".color(colors::STATUS_UNKNOWN),
    }
}
