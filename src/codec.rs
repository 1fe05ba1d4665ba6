pub(crate) const DEFAULT_CRF: u8 = 50;

const ENCODER: &str = "libvpx-vp9";

/// vp9 in constant quality mode; everything between the input span and the
/// output target.
pub(crate) struct EncodeSettings {
    pub crf: u8,
    pub height: Option<u32>,
}

impl EncodeSettings {
    pub(crate) fn vp9(crf: u8, height: Option<u32>) -> Self {
        EncodeSettings { crf, height }
    }

    pub(crate) fn args(&self) -> Vec<String> {
        // -b:v 0 lifts the bitrate cap so CRF alone drives quality
        let mut args = Vec::from(["-c:v", ENCODER, "-b:v", "0", "-crf"].map(String::from));
        args.push(self.crf.to_string());
        if let Some(height) = self.height {
            // -2 keeps the width even, yuv420p needs it
            args.push("-vf".to_string());
            args.push(format!("scale=-2:{}", height));
        }
        args.extend(["-row-mt", "1"].map(String::from));
        args
    }
}
