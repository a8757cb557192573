/// How a layer combines with what is already drawn beneath it.
///
/// All arithmetic is on premultiplied RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source over destination
    #[default]
    Normal,
    /// Additive; overlapping layers brighten instead of occluding
    PlusLighter,
    /// Drawn behind existing content
    DestinationOver,
    /// Source alpha carves a hole in the destination
    DestinationOut,
    /// Destination kept only where the source is opaque
    DestinationIn,
}

impl BlendMode {
    /// Composite premultiplied `src` onto premultiplied `dst`
    pub fn apply(&self, dst: [f32; 4], src: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        match self {
            BlendMode::Normal => {
                for i in 0..4 {
                    out[i] = src[i] + dst[i] * (1.0 - src[3]);
                }
            }
            BlendMode::PlusLighter => {
                for i in 0..4 {
                    out[i] = (src[i] + dst[i]).min(1.0);
                }
            }
            BlendMode::DestinationOver => {
                for i in 0..4 {
                    out[i] = dst[i] + src[i] * (1.0 - dst[3]);
                }
            }
            BlendMode::DestinationOut => {
                for i in 0..4 {
                    out[i] = dst[i] * (1.0 - src[3]);
                }
            }
            BlendMode::DestinationIn => {
                for i in 0..4 {
                    out[i] = dst[i] * src[3];
                }
            }
        }
        out
    }
}
