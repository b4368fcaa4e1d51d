use std::collections::BTreeSet;

use ash::vk;
use log::debug;

use crate::{
    driver::Driver,
    error::{RenderError, RenderResult},
};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics_family: Option<u32>,
    pub present_family: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// `(graphics, present)` once both are known.
    pub fn complete(&self) -> Option<(u32, u32)> {
        self.graphics_family.zip(self.present_family)
    }

    /// Distinct family indices in ascending order; empty until complete.
    pub fn unique_families(&self) -> Vec<u32> {
        match self.complete() {
            Some((graphics, present)) => BTreeSet::from([graphics, present]).into_iter().collect(),
            None => vec![],
        }
    }

    /// Scans the queue families of `physical_device` in ascending index order.
    ///
    /// The first family with the graphics bit becomes the graphics family, the
    /// first one able to present to `surface` becomes the present family. With
    /// no surface the scan only looks for graphics and leaves the present
    /// family empty.
    pub fn find(
        driver: &dyn Driver,
        physical_device: vk::PhysicalDevice,
        surface: Option<vk::SurfaceKHR>,
        verbose: bool,
    ) -> RenderResult<Self> {
        let mut family_indices = QueueFamilyIndices::default();

        let family_properties = unsafe {
            driver
                .get_physical_device_queue_family_properties(physical_device)
                .map_err(RenderError::Query)?
        };

        for (index, fp) in family_properties.iter().enumerate() {
            let index = index as u32;
            if verbose {
                debug!(
                    "queue family {index}: {:?} x{}",
                    fp.queue_flags, fp.queue_count
                );
            }

            if family_indices.graphics_family.is_none()
                && fp.queue_flags.contains(vk::QueueFlags::GRAPHICS)
            {
                family_indices.graphics_family = Some(index);
            }

            match surface {
                Some(surface) if family_indices.present_family.is_none() => {
                    let support_surface = unsafe {
                        driver
                            .get_physical_device_surface_support(physical_device, index, surface)
                            .map_err(RenderError::Query)?
                    };
                    if support_surface {
                        family_indices.present_family = Some(index);
                    }
                    if family_indices.is_complete() {
                        break;
                    }
                }
                Some(_) => {
                    if family_indices.is_complete() {
                        break;
                    }
                }
                None => {
                    if family_indices.graphics_family.is_some() {
                        break;
                    }
                }
            }
        }

        Ok(family_indices)
    }
}
