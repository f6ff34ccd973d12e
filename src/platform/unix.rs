use crate::error::{Error, Result};
use nix::sys::utsname::uname;

/// Physical RAM from `sysconf`
pub fn physical_memory_bytes() -> Result<u64> {
    let pages = unsafe { libc::sysconf(libc::_SC_PHYS_PAGES) };
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    if pages <= 0 || page_size <= 0 {
        return Err(Error::PlatformQuery(
            "sysconf did not report physical memory".to_string(),
        ));
    }

    Ok((pages as u64).saturating_mul(page_size as u64))
}

/// Kernel name and release, e.g. "Linux 6.8.0-45-generic"
pub fn kernel_identity() -> Result<String> {
    let uts = uname().map_err(|e| Error::PlatformQuery(format!("uname: {e}")))?;
    Ok(format!(
        "{} {}",
        uts.sysname().to_string_lossy(),
        uts.release().to_string_lossy()
    ))
}
