//! Host normalization: untrusted query string to a safe target host.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use log::trace;
use url::{Host, ParseError, Url};

use crate::error::{ReachabilityError, ReachabilityResult};
use crate::types::NormalizedHost;

/// Upper bound on hostname length.
const MAX_HOST_LEN: usize = 255;

/// Turn a caller-supplied string into a [`NormalizedHost`].
///
/// A full URL is reduced to its host component; anything else is validated
/// as a bare host. IP literals must be global unicast. Hostnames may only
/// contain ASCII letters, digits, `.` and `-`.
///
/// Legacy IPv4 spellings that resolvers still honour (`127.1`, `2130706433`,
/// `0x7f000001`, `0177.0.0.1`) are classified like dotted quads and come
/// back in dotted form when accepted.
///
/// Every failure is the same [`ReachabilityError::Rejected`].
pub fn normalize(raw: &str) -> ReachabilityResult<NormalizedHost> {
    let raw = raw.trim();
    let working = uri_host(raw).unwrap_or_else(|| raw.to_string());

    if let Ok(ip) = working.parse::<IpAddr>() {
        if is_global_unicast(ip) {
            return Ok(NormalizedHost::new(working));
        }
        trace!("[NORMALIZE] Non-global IP literal rejected");
        return Err(ReachabilityError::Rejected);
    }

    match Host::parse(&working) {
        Ok(Host::Ipv4(v4)) => {
            if is_global_unicast_v4(v4) {
                return Ok(NormalizedHost::new(v4.to_string()));
            }
            trace!("[NORMALIZE] Non-global legacy IPv4 form rejected");
            return Err(ReachabilityError::Rejected);
        }
        Err(ParseError::InvalidIpv4Address) => {
            trace!("[NORMALIZE] Malformed numeric host rejected");
            return Err(ReachabilityError::Rejected);
        }
        _ => {}
    }

    if working.is_empty() || working.len() > MAX_HOST_LEN {
        trace!("[NORMALIZE] Host length {} out of range", working.len());
        return Err(ReachabilityError::Rejected);
    }

    if !working.bytes().all(is_host_byte) {
        trace!("[NORMALIZE] Host contains disallowed characters");
        return Err(ReachabilityError::Rejected);
    }

    Ok(NormalizedHost::new(working))
}

/// Host component of `raw` if it is an absolute URI with a non-empty authority.
///
/// Strings such as `a:b` or `example.com:80` parse with a scheme but no
/// authority and yield `None`.
fn uri_host(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    match url.host()? {
        Host::Domain(domain) if !domain.is_empty() => Some(domain.to_string()),
        Host::Domain(_) => None,
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

fn is_host_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'-'
}

/// Global unicast: usable for ordinary host-to-host routing.
///
/// Private ranges (RFC 1918, ULA) are included. IPv6 addresses that carry an
/// IPv4 address (mapped, compatible, NAT64) are judged by that address.
pub(crate) fn is_global_unicast(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_global_unicast_v4(v4),
        IpAddr::V6(v6) => match embedded_ipv4(v6) {
            Some(v4) => is_global_unicast_v4(v4),
            None => is_global_unicast_v6(v6),
        },
    }
}

/// IPv4 address carried in the low 32 bits of `::ffff:0:0/96`,
/// `::/96` (deprecated IPv4-compatible) or `64:ff9b::/96` (NAT64).
fn embedded_ipv4(ip: Ipv6Addr) -> Option<Ipv4Addr> {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return Some(v4);
    }
    let [a, b, c, d, e, f, hi, lo] = ip.segments();
    let compatible = [a, b, c, d, e, f] == [0; 6];
    let nat64 = [a, b, c, d, e, f] == [0x64, 0xff9b, 0, 0, 0, 0];
    if compatible || nat64 {
        // `::` and `::1` land in 0.0.0.0/8 and are rejected either way.
        return Some(Ipv4Addr::from((u32::from(hi) << 16) | u32::from(lo)));
    }
    None
}

fn is_global_unicast_v4(ip: Ipv4Addr) -> bool {
    // 0.0.0.0/8 is "this network" and never a valid destination.
    !(ip.octets()[0] == 0
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast())
}

fn is_global_unicast_v6(ip: Ipv6Addr) -> bool {
    !(ip.is_unspecified() || ip.is_loopback() || ip.is_unicast_link_local() || ip.is_multicast())
}
