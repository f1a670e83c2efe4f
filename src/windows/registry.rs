//! Client library locations in `HKEY_CURRENT_USER`.

use std::path::PathBuf;
use tracing::trace;
use windows::Win32::System::Registry::{
    HKEY_CURRENT_USER, REG_SZ, RRF_RT_REG_SZ, RegGetValueW, RegSetKeyValueW,
};
use windows::core::PCWSTR;

use super::wide_string;
use crate::install::{ClientKind, LocationRegistry};
use crate::{ChannelError, Result};

const LOCATION_VALUE: &str = "Path";

/// Location registry backed by `HKCU\Software\...` keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsRegistry;

fn subkey(kind: ClientKind) -> Vec<u16> {
    wide_string(&format!("Software\\{}", kind.registry_key()))
}

impl LocationRegistry for WindowsRegistry {
    fn get(&self, kind: ClientKind) -> Option<String> {
        let key = subkey(kind);
        let value = wide_string(LOCATION_VALUE);
        let mut len = 0u32;

        unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(key.as_ptr()),
                PCWSTR::from_raw(value.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&mut len),
            )
            .ok()
            .ok()?;
        }

        let mut buf = vec![0u16; (len as usize).div_ceil(2)];
        unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(key.as_ptr()),
                PCWSTR::from_raw(value.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                Some(buf.as_mut_ptr().cast()),
                Some(&mut len),
            )
            .ok()
            .ok()?;
        }

        let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        Some(String::from_utf16_lossy(&buf[..end]))
    }

    fn set(&mut self, kind: ClientKind, path: &str) -> Result<()> {
        trace!(?kind, path, "Writing registry location");
        let key = subkey(kind);
        let value = wide_string(LOCATION_VALUE);
        let data = wide_string(path);

        unsafe {
            RegSetKeyValueW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(key.as_ptr()),
                PCWSTR::from_raw(value.as_ptr()),
                REG_SZ.0,
                Some(data.as_ptr().cast()),
                (data.len() * std::mem::size_of::<u16>()) as u32,
            )
            .ok()
            .map_err(|e| ChannelError::install(PathBuf::from(path), Some(std::io::Error::other(e))))
        }
    }
}
