//! Minimal Linux i2c-dev register access
//!
//! Opens an `/dev/i2c-N` adapter, binds the slave address with the
//! `I2C_SLAVE` ioctl, and does byte-register reads and writes as plain
//! write/read transactions. That is all the expander needs.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;
use std::path::Path;

/// `linux/i2c-dev.h`: set the slave address for subsequent transfers.
const I2C_SLAVE: u64 = 0x0703;

nix::ioctl_write_int_bad!(i2c_set_slave, I2C_SLAVE as i32);

/// Byte-register transport. The real implementation is [`I2cDev`];
/// tests substitute an in-memory register file.
pub trait RegBus: Send {
    /// Read one 8-bit register.
    fn read_reg(&mut self, reg: u8) -> io::Result<u8>;
    /// Write one 8-bit register.
    fn write_reg(&mut self, reg: u8, value: u8) -> io::Result<()>;
}

/// An open i2c-dev adapter bound to one slave address.
pub struct I2cDev {
    file: File,
}

impl I2cDev {
    /// Open `device` (an `/dev/i2c-N` node) and bind `address`.
    pub fn open(device: impl AsRef<Path>, address: u16) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(device)?;
        unsafe { i2c_set_slave(file.as_raw_fd(), i32::from(address)) }
            .map_err(io::Error::from)?;
        Ok(I2cDev { file })
    }
}

impl RegBus for I2cDev {
    fn read_reg(&mut self, reg: u8) -> io::Result<u8> {
        self.file.write_all(&[reg])?;
        let mut buf = [0u8; 1];
        self.file.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> io::Result<()> {
        self.file.write_all(&[reg, value])
    }
}
