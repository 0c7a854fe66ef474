use plotters::style::RGBColor;

/// Explicit chart styling passed to every render call. There is no global
/// plotting state; callers that want a different look construct their own.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    /// Brand red used for primary series and highlighted bars.
    pub primary: RGBColor,
    /// Near-black used for secondary series.
    pub dark: RGBColor,
    /// Darker red used for non-highlighted bars.
    pub accent: RGBColor,
    pub caption_size: u32,
    pub label_size: u32,
    pub font: &'static str,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            width: 1200,
            height: 600,
            primary: RGBColor(0xE5, 0x09, 0x14),
            dark: RGBColor(0x22, 0x1F, 0x1F),
            accent: RGBColor(0xB2, 0x07, 0x10),
            caption_size: 28,
            label_size: 16,
            font: "sans-serif",
        }
    }
}

impl ChartStyle {
    /// Taller canvas for horizontal bar charts with many labels.
    pub fn tall(&self) -> Self {
        ChartStyle {
            width: 1000,
            height: 800,
            ..self.clone()
        }
    }
}
