use crate::stack_core::codec::PixelType;

/// How a channel was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionMode {
    #[default]
    LaserScanningConfocal,
    Multiphoton,
    Widefield,
    SpinningDiskConfocal,
    Other,
}

/// Immersion medium of the objective lens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Immersion {
    #[default]
    Water,
    Oil,
    Glycerol,
    Air,
    Other,
}

/// Medium the sample is embedded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Medium {
    #[default]
    Water,
    Oil,
    Glycerol,
    Air,
    Other,
}

/// Channel-specific microscopy parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelParams {
    /// Channel name
    pub name: String,
    pub acquisition_mode: AcquisitionMode,
    /// Excitation wavelength in nm
    pub ex_wavelength_nm: f64,
    /// Emission wavelength in nm
    pub em_wavelength_nm: f64,
    /// Pinhole size in nm
    pub pinhole_size_nm: f64,
    /// Photons per excitation event (2 for multiphoton)
    pub photon_count: u32,
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            acquisition_mode: AcquisitionMode::default(),
            ex_wavelength_nm: 0.0,
            em_wavelength_nm: 0.0,
            pinhole_size_nm: 0.0,
            photon_count: 1,
        }
    }
}

/// Image-level microscopy metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageMetadata {
    pub image_name: String,

    // Dimensions
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub pixel_type: Option<PixelType>,
    pub data_size_bytes: u64,

    // Physical pixel sizes (in nm)
    pub phys_size_x_nm: f64,
    pub phys_size_y_nm: f64,
    pub phys_size_z_nm: f64,

    // Optical parameters
    pub numerical_aperture: f64,
    pub lens_immersion: Immersion,
    pub embedding_medium: Medium,
    /// Refractive index of the immersion medium
    pub immersion_ri: f64,

    pub channels: Vec<ChannelParams>,
}

impl ImageMetadata {
    /// Serialize the fields the output container can carry into its
    /// description tag. The dimension attributes follow the OME naming so
    /// the reader side can recover the Z/C/T split.
    pub fn to_description(&self) -> String {
        let mut desc = format!(
            "<Image Name=\"{}\"><Pixels DimensionOrder=\"XYZCT\" SizeX=\"{}\" SizeY=\"{}\" SizeZ=\"{}\" SizeC=\"{}\" SizeT=\"{}\"",
            self.image_name, self.size_x, self.size_y, self.size_z, self.size_c, self.size_t
        );
        if self.phys_size_x_nm > 0.0 {
            desc.push_str(&format!(
                " PhysicalSizeX=\"{}\" PhysicalSizeXUnit=\"nm\"",
                self.phys_size_x_nm
            ));
        }
        if self.phys_size_y_nm > 0.0 {
            desc.push_str(&format!(
                " PhysicalSizeY=\"{}\" PhysicalSizeYUnit=\"nm\"",
                self.phys_size_y_nm
            ));
        }
        if self.phys_size_z_nm > 0.0 {
            desc.push_str(&format!(
                " PhysicalSizeZ=\"{}\" PhysicalSizeZUnit=\"nm\"",
                self.phys_size_z_nm
            ));
        }
        desc.push('>');
        for channel in &self.channels {
            desc.push_str(&format!("<Channel Name=\"{}\"/>", channel.name));
        }
        desc.push_str("</Pixels></Image>");
        desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_carries_dimensions_and_channels() {
        let meta = ImageMetadata {
            image_name: "stack".to_string(),
            size_x: 64,
            size_y: 48,
            size_z: 5,
            size_c: 2,
            size_t: 1,
            phys_size_x_nm: 120.5,
            channels: vec![
                ChannelParams {
                    name: "GFP".to_string(),
                    ..Default::default()
                },
                ChannelParams {
                    name: "RFP".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let desc = meta.to_description();
        assert!(desc.contains("SizeZ=\"5\""));
        assert!(desc.contains("SizeC=\"2\""));
        assert!(desc.contains("DimensionOrder=\"XYZCT\""));
        assert!(desc.contains("PhysicalSizeX=\"120.5\""));
        assert!(desc.contains("<Channel Name=\"GFP\"/>"));
        assert!(!desc.contains("PhysicalSizeY"));
    }
}
