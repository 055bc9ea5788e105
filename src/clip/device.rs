// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Compute device selection for ONNX Runtime sessions

use std::fmt;
use std::str::FromStr;

use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider, ExecutionProviderDispatch,
};
use tracing::{info, warn};

/// Hardware unit that executes the CLIP graphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeDevice {
    /// NVIDIA GPU via the CUDA execution provider
    Cuda,
    /// General-purpose processor
    Cpu,
}

impl ComputeDevice {
    /// Short identifier reported by `/model/info`
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeDevice::Cuda => "cuda",
            ComputeDevice::Cpu => "cpu",
        }
    }

    /// Execution provider registered on the session builder for this device.
    ///
    /// CUDA registration fails the session build instead of falling back.
    pub fn execution_provider(&self) -> ExecutionProviderDispatch {
        match self {
            ComputeDevice::Cuda => CUDAExecutionProvider::default().build().error_on_failure(),
            ComputeDevice::Cpu => CPUExecutionProvider::default().build(),
        }
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which devices the service may try, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// Fastest available: CUDA if the runtime reports it, else CPU
    #[default]
    Auto,
    /// CUDA first, CPU if CUDA cannot be initialized
    Cuda,
    /// CPU only
    Cpu,
}

impl DevicePreference {
    /// Ordered candidate list, most preferred first. CPU is always last.
    pub fn candidates(&self) -> Vec<ComputeDevice> {
        match self {
            DevicePreference::Auto => {
                if cuda_available() {
                    vec![ComputeDevice::Cuda, ComputeDevice::Cpu]
                } else {
                    info!("CUDA execution provider not available, using CPU");
                    vec![ComputeDevice::Cpu]
                }
            }
            DevicePreference::Cuda => vec![ComputeDevice::Cuda, ComputeDevice::Cpu],
            DevicePreference::Cpu => vec![ComputeDevice::Cpu],
        }
    }
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            "cpu" => Ok(DevicePreference::Cpu),
            other => Err(format!(
                "unknown device '{}', expected one of: auto, cuda, cpu",
                other
            )),
        }
    }
}

impl fmt::Display for DevicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DevicePreference::Auto => "auto",
            DevicePreference::Cuda => "cuda",
            DevicePreference::Cpu => "cpu",
        };
        f.write_str(name)
    }
}

fn cuda_available() -> bool {
    match CUDAExecutionProvider::default().is_available() {
        Ok(available) => available,
        Err(e) => {
            warn!("Failed to query CUDA execution provider: {}", e);
            false
        }
    }
}
