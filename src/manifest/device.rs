//! Device number decomposition

/// Split a raw device number into its (major, minor) pair.
///
/// Uses the glibc encoding on Linux: 12 bits of major and 20 bits of minor,
/// split across the low and high halves of the 64-bit value.
#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "freebsd")))]
pub fn split_device(rdev: u64) -> (u32, u32) {
    let major = ((rdev >> 32) & 0xffff_f000) | ((rdev >> 8) & 0x0000_0fff);
    let minor = ((rdev >> 12) & 0xffff_ff00) | (rdev & 0x0000_00ff);
    (major as u32, minor as u32)
}

/// Split a raw device number into its (major, minor) pair.
///
/// Darwin encoding: 8 bits of major above 24 bits of minor.
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub fn split_device(rdev: u64) -> (u32, u32) {
    (((rdev >> 24) & 0xff) as u32, (rdev & 0x00ff_ffff) as u32)
}

/// Split a raw device number into its (major, minor) pair.
///
/// FreeBSD 12+ 64-bit `dev_t`: both numbers are spread over the two halves.
#[cfg(target_os = "freebsd")]
pub fn split_device(rdev: u64) -> (u32, u32) {
    let major = ((rdev >> 32) & 0xffff_ff00) | ((rdev >> 8) & 0x0000_00ff);
    let minor = ((rdev >> 24) & 0x0000_ff00) | (rdev & 0xffff_00ff);
    (major as u32, minor as u32)
}
