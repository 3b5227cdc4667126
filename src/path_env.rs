//! PATH registration, one strategy per platform family.
//!
//! POSIX installs never mutate anything persistent: `~/.local/bin` is
//! expected to be on PATH by convention and the user is only informed when
//! it is not. Windows installs persist the directory into the user-scope
//! PATH value; failure there is fatal because the installed binary would be
//! unreachable from any new terminal.

use std::ffi::OsStr;
use std::path::Path;

use log::debug;

use crate::config::InstallConfig;
use crate::error::InstallError;
use crate::report::Reporter;

/// Make sure the install directory is reachable from a shell.
pub fn register_path(config: &InstallConfig, reporter: &mut Reporter) -> Result<(), InstallError> {
    if config.platform.is_windows() {
        #[cfg(windows)]
        {
            windows_impl::register(&config.install_dir)
                .map_err(InstallError::PathRegistration)?;
        }
        Ok(())
    } else {
        posix_advise(config, reporter);
        Ok(())
    }
}

/// Component-wise membership test of `dir` in a PATH-style value.
pub fn dir_on_path(dir: &Path, path_value: Option<&OsStr>) -> bool {
    match path_value {
        Some(value) => std::env::split_paths(value).any(|component| component == dir),
        None => false,
    }
}

/// Case-insensitive substring test used by the Windows strategy to decide
/// whether the user-scope PATH already carries the install directory.
pub fn path_value_contains(current: &str, dir: &str) -> bool {
    current
        .to_ascii_lowercase()
        .contains(&dir.to_ascii_lowercase())
}

fn posix_advise(config: &InstallConfig, reporter: &mut Reporter) {
    let path_value = std::env::var_os("PATH");
    if !dir_on_path(&config.install_dir, path_value.as_deref()) {
        reporter.warn(&format!(
            "{} is not on your PATH; add it to your shell profile to use {}",
            config.install_dir.display(),
            config.binary_name
        ));
        return;
    }

    // The directory is on PATH; flag an older copy elsewhere that would
    // shadow the one we just installed.
    match which::which(&config.binary_name) {
        Ok(resolved) => {
            let installed = config.installed_path();
            let same = match (resolved.canonicalize(), installed.canonicalize()) {
                (Ok(a), Ok(b)) => a == b,
                _ => resolved == installed,
            };
            if !same {
                reporter.warn(&format!(
                    "{} resolves to {} which shadows the new install",
                    config.binary_name,
                    resolved.display()
                ));
            }
        }
        Err(err) => {
            debug!("{} not resolvable from PATH yet: {err}", config.binary_name);
        }
    }
}

#[cfg(windows)]
mod windows_impl {
    use std::path::Path;

    use anyhow::{Context, Result, anyhow};
    use log::debug;
    use windows::Win32::Foundation::ERROR_FILE_NOT_FOUND;
    use windows::Win32::System::Registry::{
        HKEY, HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_SET_VALUE, REG_EXPAND_SZ,
        REG_VALUE_TYPE, RegCloseKey, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW,
    };
    use windows::core::w;

    /// Closes the registry key on every exit path.
    struct RegistryHandle(HKEY);

    impl Drop for RegistryHandle {
        fn drop(&mut self) {
            unsafe {
                let _ = RegCloseKey(self.0);
            }
        }
    }

    /// Append `install_dir` to the user-scope PATH value if it is not
    /// already present, and mirror the change into the current process so
    /// the post-install verification works without a new session.
    pub(super) fn register(install_dir: &Path) -> Result<()> {
        let dir = install_dir.to_string_lossy().into_owned();
        let key = open_environment_key()?;
        let current = read_path_value(&key)?;

        if super::path_value_contains(&current, &dir) {
            debug!("{dir} already present in user PATH");
            return Ok(());
        }

        let updated = if current.is_empty() {
            dir.clone()
        } else {
            format!("{current};{dir}")
        };
        write_path_value(&key, &updated)?;
        refresh_process_path(&dir);
        Ok(())
    }

    fn open_environment_key() -> Result<RegistryHandle> {
        let mut key = HKEY::default();
        unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                w!("Environment"),
                0,
                KEY_QUERY_VALUE | KEY_SET_VALUE,
                &mut key,
            )
        }
        .map_err(|e| anyhow!("open HKCU\\Environment: {e}"))?;
        Ok(RegistryHandle(key))
    }

    fn read_path_value(key: &RegistryHandle) -> Result<String> {
        let mut kind = REG_VALUE_TYPE::default();
        let mut len: u32 = 0;

        // First call sizes the buffer; a missing value means an empty PATH.
        let sized = unsafe {
            RegQueryValueExW(
                key.0,
                w!("Path"),
                None,
                Some(&mut kind),
                None,
                Some(&mut len),
            )
        };
        if let Err(e) = sized {
            if e.code() == ERROR_FILE_NOT_FOUND.to_hresult() {
                return Ok(String::new());
            }
            return Err(anyhow!("query user PATH size: {e}"));
        }

        let mut buf = vec![0u16; (len as usize).div_ceil(2) + 1];
        unsafe {
            RegQueryValueExW(
                key.0,
                w!("Path"),
                None,
                Some(&mut kind),
                Some(buf.as_mut_ptr() as *mut u8),
                Some(&mut len),
            )
        }
        .map_err(|e| anyhow!("query user PATH: {e}"))?;

        let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        Ok(String::from_utf16_lossy(&buf[..end]))
    }

    fn write_path_value(key: &RegistryHandle, value: &str) -> Result<()> {
        let wide: Vec<u16> = value.encode_utf16().chain(std::iter::once(0)).collect();
        let bytes = unsafe {
            std::slice::from_raw_parts(wide.as_ptr() as *const u8, wide.len() * 2)
        };
        unsafe {
            RegSetValueExW(
                key.0,
                w!("Path"),
                0,
                REG_EXPAND_SZ,
                Some(bytes),
            )
        }
        .map_err(|e| anyhow!("persist user PATH: {e}"))
        .context("the install directory could not be added to PATH")?;
        Ok(())
    }

    fn refresh_process_path(dir: &str) {
        let mut path = std::env::var_os("PATH").unwrap_or_default();
        if !path.is_empty() {
            path.push(";");
        }
        path.push(dir);
        // Safety: the install flow is strictly sequential; no other thread
        // reads the environment while this runs.
        unsafe { std::env::set_var("PATH", &path) };
    }
}
