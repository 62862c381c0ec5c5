use std::collections::HashMap;

use super::api::{Program, TEXTURE_UNITS};

/// Compiled WGSL modules for every [`Program`], plus the active selection.
///
/// Owned by the wgpu backend; one registry per device.
pub struct ShaderRegistry {
    modules: HashMap<Program, wgpu::ShaderModule>,
    active: Option<Program>,
}

impl ShaderRegistry {
    pub fn new(device: &wgpu::Device) -> Self {
        let modules = Program::ALL
            .into_iter()
            .map(|program| {
                let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(Self::label(program)),
                    source: wgpu::ShaderSource::Wgsl(Self::source(program).into()),
                });
                (program, module)
            })
            .collect();
        log::debug!("shader registry: compiled {} programs", Program::ALL.len());
        Self { modules, active: None }
    }

    pub fn source(program: Program) -> &'static str {
        match program {
            Program::Blit => include_str!("shaders/blit.wgsl"),
            Program::Sprite => include_str!("shaders/sprite.wgsl"),
            Program::Geometry => include_str!("shaders/geometry.wgsl"),
        }
    }

    fn label(program: Program) -> &'static str {
        match program {
            Program::Blit => "rasterkit blit shader",
            Program::Sprite => "rasterkit sprite shader",
            Program::Geometry => "rasterkit geometry shader",
        }
    }

    pub fn module(&self, program: Program) -> Option<&wgpu::ShaderModule> {
        self.modules.get(&program)
    }

    #[inline]
    pub fn active(&self) -> Option<Program> {
        self.active
    }

    /// Makes `program` active. Returns `false` if it already was.
    pub fn activate(&mut self, program: Program) -> bool {
        if self.active == Some(program) {
            return false;
        }
        self.active = Some(program);
        true
    }
}

/// Texture bindings occupy `0..TEXTURE_UNITS`; the sampler follows them.
pub(crate) const SAMPLER_BINDING: u32 = TEXTURE_UNITS;
