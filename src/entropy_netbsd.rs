use crate::entropy::EntropySource;
use crate::plugin::ReadError;
use libc::{c_ulong, c_void};
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

const RANDOM_DEVICE: &str = "/dev/urandom";

// _IOR('R', 103, rndpoolstat_t)
const RNDGETPOOLSTAT: c_ulong = 0x4020_5267;

#[repr(C)]
struct RndPoolStat {
    poolsize: u32,
    threshold: u32,
    maxentropy: u32,
    added: u32,
    curentropy: u32,
    removed: u32,
    discarded: u32,
    generated: u32,
}

/// Entropy estimate from the random device's pool-status ioctl.
pub struct RandomDeviceSource;

impl RandomDeviceSource {
    pub fn new() -> Self {
        RandomDeviceSource
    }
}

impl EntropySource for RandomDeviceSource {
    fn read(&self) -> Result<f64, ReadError> {
        let device = File::open(RANDOM_DEVICE).map_err(ReadError::SourceUnavailable)?;

        let mut stat = RndPoolStat {
            poolsize: 0,
            threshold: 0,
            maxentropy: 0,
            added: 0,
            curentropy: 0,
            removed: 0,
            discarded: 0,
            generated: 0,
        };
        let rc = unsafe {
            libc::ioctl(
                device.as_raw_fd(),
                RNDGETPOOLSTAT,
                &mut stat as *mut RndPoolStat as *mut c_void,
            )
        };
        if rc < 0 {
            return Err(ReadError::ReadFailure(io::Error::last_os_error()));
        }

        Ok(f64::from(stat.curentropy))
    }
}
