use std::{path::PathBuf, rc::Rc};

use ash::vk;
use log::info;

use crate::{
    error::{RenderError, RenderResult},
    log_resource,
    vulkan_objects::{extent_helper, Device, ShaderStages},
};

/// Layout with no descriptor sets and no push constants.
pub struct PipelineLayout {
    handle: vk::PipelineLayout,
    device: Rc<Device>,
}

impl PipelineLayout {
    pub fn new(device: Rc<Device>) -> RenderResult<Self> {
        let create_info = vk::PipelineLayoutCreateInfo::builder()
            .set_layouts(&[])
            .push_constant_ranges(&[]);
        let handle = unsafe {
            device
                .driver()
                .create_pipeline_layout(device.handle(), &create_info)
        }
        .map_err(RenderError::PipelineLayoutCreation)?;
        log_resource!(device.verbosity(), "created pipeline layout {handle:?}");
        Ok(Self { handle, device })
    }

    pub fn handle(&self) -> vk::PipelineLayout {
        self.handle
    }
}

impl Drop for PipelineLayout {
    fn drop(&mut self) {
        log_resource!(self.device.verbosity(), "destroying pipeline layout {:?}", self.handle);
        unsafe {
            self.device
                .driver()
                .destroy_pipeline_layout(self.device.handle(), self.handle)
        };
    }
}

/// A built pipeline together with the layout and shader modules it was made from.
///
/// Released pipeline first, then the layout, then the shader modules.
pub struct GraphicsPipeline {
    handle: vk::Pipeline,
    layout: PipelineLayout,
    shaders: ShaderStages,
    device: Rc<Device>,
}

impl GraphicsPipeline {
    pub fn handle(&self) -> vk::Pipeline {
        self.handle
    }

    pub fn layout(&self) -> &PipelineLayout {
        &self.layout
    }

    pub fn shaders(&self) -> &ShaderStages {
        &self.shaders
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        log_resource!(self.device.verbosity(), "destroying pipeline {:?}", self.handle);
        unsafe {
            self.device
                .driver()
                .destroy_pipeline(self.device.handle(), self.handle)
        };
    }
}

/// Fixed-function state of a graphics pipeline, each piece overridable.
///
/// The defaults describe the no-vertex-input triangle pipeline: everything is
/// baked in, nothing is dynamic.
pub trait PipelineBuilder {
    fn device(&self) -> Rc<Device>;
    fn extent(&self) -> vk::Extent2D;
    fn render_pass(&self) -> vk::RenderPass;
    fn shader_stages(&self) -> Vec<(PathBuf, vk::ShaderStageFlags)>;

    fn subpass(&self) -> u32 {
        0
    }

    fn vertex_binding_descriptions(&self) -> Vec<vk::VertexInputBindingDescription> {
        vec![]
    }

    fn vertex_attribute_descriptions(&self) -> Vec<vk::VertexInputAttributeDescription> {
        vec![]
    }

    fn input_assembly_state_create_info(&self) -> vk::PipelineInputAssemblyStateCreateInfo {
        vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false)
            .build()
    }

    fn viewport(&self) -> vk::Viewport {
        extent_helper::viewport_from_extent(self.extent())
    }

    fn scissor(&self) -> vk::Rect2D {
        extent_helper::scissor_from_extent(self.extent())
    }

    fn rasterization_state_create_info(&self) -> vk::PipelineRasterizationStateCreateInfo {
        vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::CLOCKWISE)
            .depth_bias_enable(false)
            .build()
    }

    fn multisample_state_create_info(&self) -> vk::PipelineMultisampleStateCreateInfo {
        vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1)
            .build()
    }

    fn depth_stencil_state_create_info(&self) -> Option<vk::PipelineDepthStencilStateCreateInfo> {
        None
    }

    fn color_blend_attach_state(&self) -> vk::PipelineColorBlendAttachmentState {
        vk::PipelineColorBlendAttachmentState::builder()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(false)
            .src_color_blend_factor(vk::BlendFactor::ONE)
            .dst_color_blend_factor(vk::BlendFactor::ZERO)
            .color_blend_op(vk::BlendOp::ADD)
            .src_alpha_blend_factor(vk::BlendFactor::ONE)
            .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
            .alpha_blend_op(vk::BlendOp::ADD)
            .build()
    }

    fn dynamic_states(&self) -> Vec<vk::DynamicState> {
        vec![]
    }

    fn build(&self) -> RenderResult<GraphicsPipeline> {
        let device = self.device();
        let shaders = ShaderStages::load(&device, &self.shader_stages())?;
        let layout = PipelineLayout::new(device.clone())?;

        let stage_infos = shaders.stage_create_infos();
        let bindings = self.vertex_binding_descriptions();
        let attributes = self.vertex_attribute_descriptions();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);
        let input_assembly = self.input_assembly_state_create_info();
        let viewports = [self.viewport()];
        let scissors = [self.scissor()];
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewports(&viewports)
            .scissors(&scissors);
        let rasterization = self.rasterization_state_create_info();
        let multisample = self.multisample_state_create_info();
        let blend_attachments = [self.color_blend_attach_state()];
        let color_blend = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .logic_op(vk::LogicOp::COPY)
            .attachments(&blend_attachments)
            .blend_constants([0.; 4]);
        let depth_stencil = self.depth_stencil_state_create_info();
        let dynamic_states = self.dynamic_states();
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states);

        let mut create_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stage_infos)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .color_blend_state(&color_blend)
            .layout(layout.handle())
            .render_pass(self.render_pass())
            .subpass(self.subpass())
            .base_pipeline_handle(vk::Pipeline::null())
            .base_pipeline_index(-1);
        if let Some(depth_stencil) = depth_stencil.as_ref() {
            create_info = create_info.depth_stencil_state(depth_stencil);
        }
        if !dynamic_states.is_empty() {
            create_info = create_info.dynamic_state(&dynamic_state);
        }

        let handle = unsafe {
            device
                .driver()
                .create_graphics_pipeline(device.handle(), &create_info)
        }
        .map_err(RenderError::PipelineCreation)?;
        info!(
            "created graphics pipeline with {} shader stage(s)",
            stage_infos.len()
        );

        Ok(GraphicsPipeline {
            handle,
            layout,
            shaders,
            device,
        })
    }
}

/// Vertex + fragment pipeline drawing into subpass 0 of `render_pass`.
pub struct FixedPipelineBuilder {
    device: Rc<Device>,
    extent: vk::Extent2D,
    render_pass: vk::RenderPass,
    vertex_shader: PathBuf,
    fragment_shader: PathBuf,
}

impl FixedPipelineBuilder {
    pub fn new(
        device: Rc<Device>,
        extent: vk::Extent2D,
        render_pass: vk::RenderPass,
        vertex_shader: PathBuf,
        fragment_shader: PathBuf,
    ) -> Self {
        Self {
            device,
            extent,
            render_pass,
            vertex_shader,
            fragment_shader,
        }
    }
}

impl PipelineBuilder for FixedPipelineBuilder {
    fn device(&self) -> Rc<Device> {
        self.device.clone()
    }

    fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    fn shader_stages(&self) -> Vec<(PathBuf, vk::ShaderStageFlags)> {
        vec![
            (self.vertex_shader.clone(), vk::ShaderStageFlags::VERTEX),
            (self.fragment_shader.clone(), vk::ShaderStageFlags::FRAGMENT),
        ]
    }
}
