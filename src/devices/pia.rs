//! Peripheral Interface Adapter: the keyboard FIFO and the file-load
//! request block, both exposed as memory-mapped registers in the
//! $D000-$D00F window.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Register offsets relative to the start of the PIA's mapped window.
pub mod reg {
    /// Read-only. Consumes the head of the key FIFO, or 0x00 if empty.
    pub const KEY_DATA: u16 = 0x00;
    /// Read-only. Bit 0 set iff the key FIFO is non-empty.
    pub const KEY_STATUS: u16 = 0x01;
    /// 16-bit little-endian pointer to a zero-terminated filename in RAM.
    pub const FILENAME_PTR_LO: u16 = 0x02;
    pub const FILENAME_PTR_HI: u16 = 0x03;
    /// 16-bit little-endian target load address.
    pub const FILE_ADDR_LO: u16 = 0x04;
    pub const FILE_ADDR_HI: u16 = 0x05;
    /// Write-only. A non-zero write arms a file-load request.
    pub const FILE_CMD: u16 = 0x06;
    /// Read-only. 0 = OK, non-zero = error kind, once `FILE_COMPLETE` is set.
    pub const FILE_RESULT: u16 = 0x07;
    /// Read-only. Bit 0 set once the armed request has been serviced.
    pub const FILE_COMPLETE: u16 = 0x08;
    /// Read-only. Length, in bytes, of the file the last request loaded;
    /// valid once `FILE_COMPLETE` is set and `FILE_RESULT` is 0. The `L:`
    /// command needs this to print how many bytes it just loaded.
    pub const FILE_LEN_LO: u16 = 0x09;
    pub const FILE_LEN_HI: u16 = 0x0A;
}

pub const KEY_STATUS_READY: u8 = 0x01;
pub const FILE_COMPLETE_BIT: u8 = 0x01;

/// A file-load request as armed by the monitor's `L:` command, consumed
/// once by [`crate::machine::Machine::service_file_request`].
#[derive(Debug, Clone, Copy)]
pub struct FileRequest {
    pub filename_ptr: u16,
    pub target_addr: u16,
    pub command: u8,
}

pub struct Pia {
    key_fifo: Mutex<VecDeque<u8>>,
    filename_ptr: u16,
    file_addr: u16,
    file_cmd: u8,
    file_result: u8,
    file_len: u16,
    file_complete: bool,
    /// Set when a command byte is written; cleared once the machine's
    /// file service has resolved it. Distinct from `file_complete`, which
    /// tells the *monitor* a result is ready to read.
    pending: bool,
}

impl Pia {
    pub fn new() -> Pia {
        Pia {
            key_fifo: Mutex::new(VecDeque::new()),
            filename_ptr: 0,
            file_addr: 0,
            file_cmd: 0,
            file_result: 0,
            file_len: 0,
            file_complete: false,
            pending: false,
        }
    }

    /// Append a key code to the FIFO. Safe to call from any thread.
    pub fn enqueue_key(&self, ascii: u8) {
        self.key_fifo.lock().unwrap().push_back(ascii);
    }

    pub fn key_ready(&self) -> bool {
        !self.key_fifo.lock().unwrap().is_empty()
    }

    fn read_key_data(&self) -> u8 {
        self.key_fifo.lock().unwrap().pop_front().unwrap_or(0)
    }

    fn key_status(&self) -> u8 {
        if self.key_ready() {
            KEY_STATUS_READY
        } else {
            0
        }
    }

    /// Take the armed request, if any, clearing `pending` so the same
    /// command byte is never serviced twice.
    pub fn take_pending_request(&mut self) -> Option<FileRequest> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(FileRequest {
            filename_ptr: self.filename_ptr,
            target_addr: self.file_addr,
            command: self.file_cmd,
        })
    }

    pub fn complete_file_request(&mut self, result: u8, len: u16) {
        self.file_result = result;
        self.file_len = len;
        self.file_complete = true;
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            reg::KEY_DATA => self.read_key_data(),
            reg::KEY_STATUS => self.key_status(),
            reg::FILENAME_PTR_LO => self.filename_ptr.to_le_bytes()[0],
            reg::FILENAME_PTR_HI => self.filename_ptr.to_le_bytes()[1],
            reg::FILE_ADDR_LO => self.file_addr.to_le_bytes()[0],
            reg::FILE_ADDR_HI => self.file_addr.to_le_bytes()[1],
            reg::FILE_RESULT => self.file_result,
            reg::FILE_LEN_LO => self.file_len.to_le_bytes()[0],
            reg::FILE_LEN_HI => self.file_len.to_le_bytes()[1],
            reg::FILE_COMPLETE => {
                if self.file_complete {
                    FILE_COMPLETE_BIT
                } else {
                    0
                }
            }
            _ => 0,
        }
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            reg::FILENAME_PTR_LO => {
                self.filename_ptr = u16::from_le_bytes([data, self.filename_ptr.to_le_bytes()[1]])
            }
            reg::FILENAME_PTR_HI => {
                self.filename_ptr = u16::from_le_bytes([self.filename_ptr.to_le_bytes()[0], data])
            }
            reg::FILE_ADDR_LO => {
                self.file_addr = u16::from_le_bytes([data, self.file_addr.to_le_bytes()[1]])
            }
            reg::FILE_ADDR_HI => {
                self.file_addr = u16::from_le_bytes([self.file_addr.to_le_bytes()[0], data])
            }
            reg::FILE_CMD => {
                self.file_cmd = data;
                self.file_complete = false;
                self.pending = data != 0;
            }
            _ => {}
        }
    }
}

impl Default for Pia {
    fn default() -> Pia {
        Pia::new()
    }
}
