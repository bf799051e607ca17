//! Linux / Android device access
//!
//! Control-node ioctls for the L3G4200D gyro and `/dev/input` event-node
//! discovery by device name.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use contracts::{CalibrationOffsets, DeviceConfig, DriverConfig, DriverError, DriverResult};
use ingestion::InputReader;
use tracing::{debug, info, instrument, warn};

use crate::clock::SystemClock;
use crate::control::DeviceControl;
use crate::sensor::GyroSensor;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;
const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

const fn ioctl_code(direction: u32, kind: u8, nr: u8, size: usize) -> libc::Ioctl {
    ((direction << IOC_DIRSHIFT)
        | ((kind as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)) as libc::Ioctl
}

const fn iow<T>(kind: u8, nr: u8) -> libc::Ioctl {
    ioctl_code(IOC_WRITE, kind, nr, std::mem::size_of::<T>())
}

const fn ior<T>(kind: u8, nr: u8) -> libc::Ioctl {
    ioctl_code(IOC_READ, kind, nr, std::mem::size_of::<T>())
}

/// l3g4200d ioctl magic
const L3G4200D_IOCTL_BASE: u8 = 77;

const L3G4200D_IOCTL_SET_DELAY: libc::Ioctl = iow::<libc::c_int>(L3G4200D_IOCTL_BASE, 0);
const L3G4200D_IOCTL_SET_ENABLE: libc::Ioctl = iow::<libc::c_int>(L3G4200D_IOCTL_BASE, 2);
const L3G4200D_IOCTL_GET_CALIBRATION: libc::Ioctl =
    ior::<[libc::c_int; 3]>(L3G4200D_IOCTL_BASE, 4);

fn eviocgname(len: usize) -> libc::Ioctl {
    ioctl_code(IOC_READ, b'E', 0x06, len)
}

const INPUT_DIR: &str = "/dev/input";

/// L3G4200D control node
pub struct L3g4200dControl {
    path: PathBuf,
    file: Option<File>,
}

impl L3g4200dControl {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    fn fd(&self, operation: &'static str) -> DriverResult<libc::c_int> {
        self.file
            .as_ref()
            .map(|f| f.as_raw_fd())
            .ok_or(DriverError::DeviceIo {
                operation,
                errno: libc::EBADF,
            })
    }

    fn write_int(
        &self,
        operation: &'static str,
        code: libc::Ioctl,
        value: libc::c_int,
    ) -> DriverResult<()> {
        let fd = self.fd(operation)?;
        let mut arg = value;
        let rc = unsafe { libc::ioctl(fd, code, &mut arg) };
        if rc < 0 {
            return Err(DriverError::device_io(operation, &io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl DeviceControl for L3g4200dControl {
    #[instrument(name = "l3g4200d_open", skip(self), fields(path = %self.path.display()))]
    fn open(&mut self) -> DriverResult<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| DriverError::device_io("open", &e))?;
        debug!(fd = file.as_raw_fd(), "control node opened");
        self.file = Some(file);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn close(&mut self) {
        // File closes the descriptor on drop
        self.file = None;
    }

    fn set_enabled(&mut self, enabled: bool) -> DriverResult<()> {
        self.write_int(
            "set_enable",
            L3G4200D_IOCTL_SET_ENABLE,
            libc::c_int::from(enabled),
        )
    }

    fn set_delay_ms(&mut self, delay_ms: i32) -> DriverResult<()> {
        self.write_int("set_delay", L3G4200D_IOCTL_SET_DELAY, delay_ms)
    }

    fn read_calibration(&mut self) -> DriverResult<CalibrationOffsets> {
        let fd = self.fd("get_calibration")?;
        let mut raw: [libc::c_int; 3] = [0; 3];
        let rc = unsafe { libc::ioctl(fd, L3G4200D_IOCTL_GET_CALIBRATION, raw.as_mut_ptr()) };
        if rc < 0 {
            return Err(DriverError::device_io(
                "get_calibration",
                &io::Error::last_os_error(),
            ));
        }
        Ok(CalibrationOffsets::from(raw))
    }
}

/// Name reported by an evdev node (`EVIOCGNAME`)
pub fn input_device_name(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut buf = [0u8; 256];
    let rc = unsafe { libc::ioctl(file.as_raw_fd(), eviocgname(buf.len()), buf.as_mut_ptr()) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

/// Scan `/dev/input/event*` for the node named `name`
pub fn find_input_node(name: &str) -> io::Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(INPUT_DIR)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("event"))
        })
        .collect();
    candidates.sort();

    for path in candidates {
        match input_device_name(&path) {
            Ok(found) if found == name => {
                info!(path = %path.display(), name, "input node found");
                return Ok(path);
            }
            Ok(found) => debug!(path = %path.display(), found, "input node skipped"),
            Err(e) => debug!(path = %path.display(), error = %e, "input node not readable"),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no input device named '{name}' under {INPUT_DIR}"),
    ))
}

/// Configured input node, or the discovered one
pub fn resolve_input_path(config: &DeviceConfig) -> io::Result<PathBuf> {
    match &config.input_path {
        Some(path) => Ok(path.clone()),
        None => find_input_node(&config.input_name),
    }
}

/// Non-blocking evdev node with a bounded wait per read
///
/// A read waits up to `poll_timeout` for data, then reports `WouldBlock`,
/// so a polling loop can check for shutdown between reads.
pub struct InputNode {
    file: File,
    poll_timeout: Duration,
}

impl InputNode {
    pub fn open(path: &Path, poll_timeout: Duration) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        debug!(path = %path.display(), "input node opened");
        Ok(Self { file, poll_timeout })
    }

    fn wait_readable(&self) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout =
            libc::c_int::try_from(self.poll_timeout.as_millis()).unwrap_or(libc::c_int::MAX);
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }
        Ok(rc > 0)
    }
}

impl Read for InputNode {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.wait_readable()? {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        self.file.read(buf)
    }
}

/// Gyro wired to the kernel driver
pub type LinuxGyro = GyroSensor<L3g4200dControl, InputReader<InputNode>, SystemClock>;

/// Open the control node and the gyro's input node
///
/// The control handle follows the facade's lazy-open rules; a missing input
/// node is an error since nothing could ever be read.
pub fn open_gyro(config: &DriverConfig, poll_timeout: Duration) -> DriverResult<LinuxGyro> {
    let input_path = resolve_input_path(&config.device).map_err(|e| {
        warn!(error = %e, name = %config.device.input_name, "gyro input node unavailable");
        DriverError::device_io("open_input", &e)
    })?;
    let node = InputNode::open(&input_path, poll_timeout)
        .map_err(|e| DriverError::device_io("open_input", &e))?;

    Ok(GyroSensor::new(
        config,
        L3g4200dControl::new(&config.device.control_path),
        InputReader::new(node, config.reader.capacity),
        SystemClock,
    ))
}
