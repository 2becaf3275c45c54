use std::{
    mem,
    ptr,
};

use windows_sys::Win32::UI::Shell::{
    SHEmptyRecycleBinW,
    SHQueryRecycleBinW,
    SHERB_NOCONFIRMATION,
    SHERB_NOPROGRESSUI,
    SHERB_NOSOUND,
    SHQUERYRBINFO,
};

use super::RecycleBin;
use crate::BinError;

/// Returned by SHEmptyRecycleBinW if there is nothing to delete.
const E_UNEXPECTED: i32 = 0x8000_FFFF_u32 as i32;

/// The recycle bin of all drives, managed by the Windows shell.
#[derive(Debug, Default)]
pub struct ShellRecycleBin;

impl ShellRecycleBin {
    pub fn new() -> Self {
        Self
    }
}

impl RecycleBin for ShellRecycleBin {
    fn name(&self) -> &str {
        "recycle bin"
    }

    fn size(&self) -> Result<u64, BinError> {
        let mut info = SHQUERYRBINFO {
            cbSize: mem::size_of::<SHQUERYRBINFO>() as u32,
            i64Size: 0,
            i64NumItems: 0,
        };

        let status = unsafe { SHQueryRecycleBinW(ptr::null(), &mut info) };
        if status != 0 {
            return Err(BinError::Os {
                operation: "SHQueryRecycleBinW",
                status,
            });
        }

        let size = info.i64Size;
        Ok(size.max(0) as u64)
    }

    fn empty(&self) -> Result<(), BinError> {
        let flags = SHERB_NOCONFIRMATION | SHERB_NOPROGRESSUI | SHERB_NOSOUND;
        let status = unsafe { SHEmptyRecycleBinW(ptr::null_mut(), ptr::null(), flags) };

        match status {
            0 | E_UNEXPECTED => Ok(()),
            status => Err(BinError::Os {
                operation: "SHEmptyRecycleBinW",
                status,
            }),
        }
    }
}
