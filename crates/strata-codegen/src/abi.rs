// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Calling conventions and the registers they use.

use std::fmt;
use std::str::FromStr;

/// Target calling convention. Chosen per compilation, never inferred from source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallingConvention {
    /// Microsoft x64: `rcx, rdx, r8, r9`, 32 bytes of shadow space, exit via `ExitProcess`.
    Win64,
    /// System V AMD64: `rdi, rsi, rdx, rcx, r8, r9`, exit by returning from `main`.
    SystemV,
}

/// General-purpose registers the generator touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    Rax,
    Rbp,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    R8,
    R9,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg::Rax => "rax",
            Reg::Rbp => "rbp",
            Reg::Rcx => "rcx",
            Reg::Rdx => "rdx",
            Reg::Rsi => "rsi",
            Reg::Rdi => "rdi",
            Reg::R8 => "r8",
            Reg::R9 => "r9",
        };
        f.write_str(name)
    }
}

const WIN64_PARAMS: &[Reg] = &[Reg::Rcx, Reg::Rdx, Reg::R8, Reg::R9];
const SYSV_PARAMS: &[Reg] = &[Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9];

impl CallingConvention {
    /// The convention of the machine running the compiler.
    pub fn host() -> Self {
        if cfg!(windows) {
            CallingConvention::Win64
        } else {
            CallingConvention::SystemV
        }
    }

    /// Integer argument registers, in argument order.
    pub fn param_registers(self) -> &'static [Reg] {
        match self {
            CallingConvention::Win64 => WIN64_PARAMS,
            CallingConvention::SystemV => SYSV_PARAMS,
        }
    }

    pub fn first_arg(self) -> Reg {
        self.param_registers()[0]
    }

    /// Bytes the caller reserves above the return address for the callee.
    pub fn shadow_space(self) -> usize {
        match self {
            CallingConvention::Win64 => 32,
            CallingConvention::SystemV => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CallingConvention::Win64 => "win64",
            CallingConvention::SystemV => "sysv",
        }
    }
}

impl Default for CallingConvention {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallingConvention::Win64 => f.write_str("Windows x64"),
            CallingConvention::SystemV => f.write_str("System V AMD64"),
        }
    }
}

/// Error for an unrecognised ABI name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAbi(pub String);

impl fmt::Display for UnknownAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown ABI '{}' (expected win64 or sysv)", self.0)
    }
}

impl std::error::Error for UnknownAbi {}

impl FromStr for CallingConvention {
    type Err = UnknownAbi;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "win64" | "windows" | "win" => Ok(CallingConvention::Win64),
            "sysv" | "systemv" | "linux" | "macos" => Ok(CallingConvention::SystemV),
            _ => Err(UnknownAbi(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_orders() {
        let win: Vec<String> = CallingConvention::Win64
            .param_registers()
            .iter()
            .map(Reg::to_string)
            .collect();
        assert_eq!(win, ["rcx", "rdx", "r8", "r9"]);
        assert_eq!(CallingConvention::SystemV.first_arg(), Reg::Rdi);
        assert_eq!(CallingConvention::SystemV.param_registers().len(), 6);
    }

    #[test]
    fn parse_names() {
        assert_eq!("Win64".parse(), Ok(CallingConvention::Win64));
        assert_eq!("linux".parse(), Ok(CallingConvention::SystemV));
        assert!("arm".parse::<CallingConvention>().is_err());
    }
}
