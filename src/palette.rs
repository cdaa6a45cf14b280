use crate::error::ViewerError;

const ENTRIES: usize = 256;
const STRIDE: usize = 4;

/// 256-entry color lookup with a 4-byte stride.
///
/// Entries are stored in the byte order of the palette source; `bgr` returns
/// the channels swapped the way palette-indexed volumes are displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteTable {
    table: Vec<u8>,
}

impl PaletteTable {
    /// Accepts a flat table of 256 RGB or 256 RGBA entries.
    pub fn from_flat(data: &[u8]) -> Result<Self, ViewerError> {
        let table = match data.len() {
            len if len == ENTRIES * STRIDE => data.to_vec(),
            len if len == ENTRIES * 3 => data
                .chunks_exact(3)
                .flat_map(|c| [c[0], c[1], c[2], 255])
                .collect(),
            len => return Err(ViewerError::InvalidPalette { len }),
        };
        Ok(Self { table })
    }

    pub fn grayscale() -> Self {
        let table = (0..ENTRIES)
            .flat_map(|i| {
                let v = i as u8;
                [v, v, v, 255]
            })
            .collect();
        Self { table }
    }

    /// Color of a label, as written into an RGBA buffer.
    #[inline]
    pub fn bgr(&self, index: u8) -> [u8; 3] {
        let i = index as usize * STRIDE;
        [self.table[i + 2], self.table[i + 1], self.table[i]]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.table
    }
}

impl Default for PaletteTable {
    fn default() -> Self {
        Self::grayscale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_palette_is_widened_to_four_byte_stride() {
        let rgb: Vec<u8> = (0..256).flat_map(|i| [i as u8, 1, 2]).collect();
        let palette = PaletteTable::from_flat(&rgb).unwrap();
        assert_eq!(palette.as_bytes().len(), 1024);
        assert_eq!(&palette.as_bytes()[40..44], &[10, 1, 2, 255]);
    }

    #[test]
    fn bgr_swaps_first_and_third_channel() {
        let rgba: Vec<u8> = (0..256).flat_map(|i| [i as u8, 100, 200, 0]).collect();
        let palette = PaletteTable::from_flat(&rgba).unwrap();
        assert_eq!(palette.bgr(7), [200, 100, 7]);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(matches!(
            PaletteTable::from_flat(&[0; 100]),
            Err(ViewerError::InvalidPalette { len: 100 })
        ));
    }
}
