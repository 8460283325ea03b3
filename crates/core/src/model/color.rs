//! PDF color space definitions.

/// Represents a PDF color space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PDFColorSpace {
    /// Name of the color space (e.g., "DeviceRGB")
    pub name: String,
    /// Number of color components
    pub ncomponents: usize,
}

impl PDFColorSpace {
    /// Create a new color space.
    pub fn new(name: &str, ncomponents: usize) -> Self {
        Self {
            name: name.to_string(),
            ncomponents,
        }
    }

    /// Look up one of the predefined color spaces by name.
    ///
    /// Unknown names (ICCBased streams, resource-local names) resolve to a
    /// single-component space carrying the given name.
    pub fn predefined(name: &str) -> Self {
        let ncomponents = match name {
            "DeviceGray" | "CalGray" | "G" => 1,
            "DeviceRGB" | "CalRGB" | "Lab" | "RGB" => 3,
            "DeviceCMYK" | "CMYK" => 4,
            _ => 1,
        };
        let name = match name {
            "G" => "DeviceGray",
            "RGB" => "DeviceRGB",
            "CMYK" => "DeviceCMYK",
            other => other,
        };
        Self::new(name, ncomponents)
    }
}

impl Default for PDFColorSpace {
    fn default() -> Self {
        Self::new("DeviceGray", 1)
    }
}
