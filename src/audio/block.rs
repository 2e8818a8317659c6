//! Bloc d'échantillons capturés et mesure d'énergie

/// Fenêtre de capture mono en PCM i16
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlock {
    samples: Vec<i16>,
}

impl AudioBlock {
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    /// Bloc de `len` échantillons nuls
    #[cfg(test)]
    pub fn silence(len: usize) -> Self {
        Self::new(vec![0; len])
    }

    #[cfg(test)]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Norme euclidienne (L2) des échantillons, sans normalisation
    ///
    /// La somme est accumulée en i64 : 1024 × 32768² tient largement, le
    /// résultat est donc exact avant la racine carrée.
    pub fn norm(&self) -> f64 {
        let sum_sq: i64 = self
            .samples
            .iter()
            .map(|&s| {
                let s = i64::from(s);
                s * s
            })
            .sum();
        (sum_sq as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_has_zero_norm() {
        assert_eq!(AudioBlock::silence(1024).norm(), 0.0);
    }

    #[test]
    fn test_full_scale_norm() {
        let block = AudioBlock::new(vec![i16::MAX; 1024]);
        // 32767 * sqrt(1024) = 32767 * 32
        assert_eq!(block.norm(), 1_048_544.0);
    }

    #[test]
    fn test_single_spike_norm() {
        let mut samples = vec![0i16; 1024];
        samples[512] = 6000;
        assert_eq!(AudioBlock::new(samples).norm(), 6000.0);
    }

    #[test]
    fn test_negative_samples_count_fully() {
        let mut samples = vec![0i16; 1024];
        samples[0] = i16::MIN;
        assert_eq!(AudioBlock::new(samples).norm(), 32768.0);
    }

    #[test]
    fn test_norm_is_deterministic() {
        let samples: Vec<i16> = (0..1024).map(|i| ((i * 37) % 2000 - 1000) as i16).collect();
        let block = AudioBlock::new(samples);
        let first = block.norm();
        for _ in 0..10 {
            assert_eq!(block.norm().to_bits(), first.to_bits());
        }
    }
}
