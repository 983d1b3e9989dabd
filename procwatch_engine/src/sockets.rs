//! Inet socket table: host-wide connection count and per-process socket counts.
//!
//! On Linux the kernel lists every tcp/udp socket (v4 and v6) under `/proc/net`;
//! a process owns a connection when one of its `/proc/<pid>/fd` links points at
//! `socket:[inode]` with an inode from those tables. Other platforms report the
//! sensor as unavailable.

use std::collections::HashSet;

use crate::error::ReadError;

#[cfg(target_os = "linux")]
const TABLES: [&str; 4] = [
    "/proc/net/tcp",
    "/proc/net/tcp6",
    "/proc/net/udp",
    "/proc/net/udp6",
];

#[derive(Debug, Default, Clone)]
pub struct SocketTable {
    inodes: HashSet<u64>,
    entries: usize,
}

impl SocketTable {
    /// Read all inet socket tables. `None` when no table could be read.
    #[cfg(target_os = "linux")]
    pub fn read() -> Option<SocketTable> {
        let mut table = SocketTable::default();
        let mut any = false;
        for path in TABLES {
            // tcp6/udp6 are missing on hosts with ipv6 disabled
            if let Ok(s) = std::fs::read_to_string(path) {
                table.add_table(&s);
                any = true;
            }
        }
        any.then_some(table)
    }

    #[cfg(not(target_os = "linux"))]
    pub fn read() -> Option<SocketTable> {
        None
    }

    /// Merge one `/proc/net/{tcp,udp}[6]` listing.
    pub fn add_table(&mut self, content: &str) {
        // header line, then: sl local_address rem_address st tx_queue:rx_queue tr:tm->when retrnsmt uid timeout inode ...
        for line in content.lines().skip(1) {
            let Some(inode) = line.split_whitespace().nth(9) else {
                continue;
            };
            self.entries += 1;
            if let Ok(v) = inode.parse::<u64>() {
                // inode 0 marks sockets in TIME_WAIT with no owner
                if v != 0 {
                    self.inodes.insert(v);
                }
            }
        }
    }

    /// Total number of inet sockets on the host.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn contains(&self, inode: u64) -> bool {
        self.inodes.contains(&inode)
    }

    /// Count the inet sockets held open by `pid`.
    #[cfg(target_os = "linux")]
    pub fn count_for(&self, pid: u32) -> Result<u32, ReadError> {
        let dir = format!("/proc/{pid}/fd");
        let entries = std::fs::read_dir(&dir).map_err(|e| ReadError::from_io(&e, pid))?;
        let mut n = 0u32;
        for entry in entries.flatten() {
            // fds close while we walk the table; a vanished link is not an error
            let Ok(target) = std::fs::read_link(entry.path()) else {
                continue;
            };
            if let Some(inode) = parse_socket_link(&target.to_string_lossy()) {
                if self.contains(inode) {
                    n = n.saturating_add(1);
                }
            }
        }
        Ok(n)
    }

    #[cfg(not(target_os = "linux"))]
    pub fn count_for(&self, _pid: u32) -> Result<u32, ReadError> {
        Err(ReadError::SensorUnavailable {
            sensor: "process sockets",
        })
    }
}

/// `socket:[12345]` → `12345`
pub fn parse_socket_link(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TCP: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:0277 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 21043 1 0000000000000000 100 0 0 10 0
   1: 0100007F:9C4A 0100007F:0277 06 00000000:00000000 03:00000F4C 00000000     0        0 0 3 0000000000000000
   2: 0F02000A:A1B2 22D8B85D:01BB 01 00000000:00000000 02:00000A3D 00000000  1000        0 88812 2 0000000000000000 20 4 30 10 -1
";

    #[test]
    fn parses_entries_and_inodes() {
        let mut t = SocketTable::default();
        t.add_table(TCP);
        assert_eq!(t.len(), 3);
        assert!(t.contains(21043));
        assert!(t.contains(88812));
        assert!(!t.contains(0));
    }

    #[test]
    fn merges_multiple_tables() {
        let mut t = SocketTable::default();
        t.add_table(TCP);
        t.add_table("header only\n");
        t.add_table(TCP);
        assert_eq!(t.len(), 6);
        assert!(!t.is_empty());
    }

    #[test]
    fn socket_links() {
        assert_eq!(parse_socket_link("socket:[88812]"), Some(88812));
        assert_eq!(parse_socket_link("pipe:[88812]"), None);
        assert_eq!(parse_socket_link("/dev/null"), None);
        assert_eq!(parse_socket_link("socket:[abc]"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn own_process_is_countable() {
        let t = SocketTable::read().unwrap_or_default();
        assert!(t.count_for(std::process::id()).is_ok());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_process_reports_gone() {
        let t = SocketTable::default();
        // above pid_max on every Linux configuration
        let pid = 4_194_304 + 17;
        assert_eq!(t.count_for(pid), Err(ReadError::ProcessGone { pid }));
    }
}
