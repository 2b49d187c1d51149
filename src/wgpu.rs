use std::env;

use burn::tensor::backend::Backend as BackendTrait;
use burn_wgpu::{self, MemoryConfiguration, RuntimeOptions, Wgpu, graphics};
use tracing::warn;

pub type WgpuDevice = <Wgpu<f32> as BackendTrait>::Device;

/// Set up the wgpu runtime for `device` before the first batch is uploaded.
///
/// `ARGON_WGPU_BACKEND` selects the graphics API (`auto`, `vulkan`, `dx12`,
/// `metal`, `opengl`) and `ARGON_WGPU_MEMORY` the allocator (`subslices` or
/// `exclusive`).
pub fn init_runtime(device: &WgpuDevice) {
    if matches!(device, WgpuDevice::Existing(_)) {
        return;
    }

    let options = runtime_options();
    let api = env::var("ARGON_WGPU_BACKEND")
        .unwrap_or_default()
        .to_ascii_lowercase();
    match api.as_str() {
        "vulkan" => burn_wgpu::init_setup::<graphics::Vulkan>(device, options),
        "dx12" => burn_wgpu::init_setup::<graphics::Dx12>(device, options),
        "metal" => burn_wgpu::init_setup::<graphics::Metal>(device, options),
        "opengl" | "gl" => burn_wgpu::init_setup::<graphics::OpenGl>(device, options),
        "" | "auto" => burn_wgpu::init_setup::<graphics::AutoGraphicsApi>(device, options),
        other => {
            warn!("unknown ARGON_WGPU_BACKEND `{other}`, using auto");
            burn_wgpu::init_setup::<graphics::AutoGraphicsApi>(device, options)
        }
    };
}

fn runtime_options() -> RuntimeOptions {
    let memory_config = match env::var("ARGON_WGPU_MEMORY")
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "exclusive" => MemoryConfiguration::ExclusivePages,
        "" | "subslices" => MemoryConfiguration::SubSlices,
        other => {
            warn!("unknown ARGON_WGPU_MEMORY `{other}`, using subslices");
            MemoryConfiguration::SubSlices
        }
    };

    RuntimeOptions {
        memory_config,
        ..RuntimeOptions::default()
    }
}
