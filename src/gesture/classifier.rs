use super::Hand;

/// Per-frame pinch detection: thumb tip and index tip closer than a pixel
/// threshold. No smoothing or debounce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchClassifier {
    threshold_px: f64,
}

impl Default for PinchClassifier {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl PinchClassifier {
    pub fn new(threshold_px: f64) -> Self {
        Self { threshold_px }
    }

    pub fn threshold_px(&self) -> f64 {
        self.threshold_px
    }

    /// Only the first hand counts; no hands means not pinched.
    pub fn classify(&self, hands: &[Hand], frame_width: u32, frame_height: u32) -> bool {
        let Some(hand) = hands.first() else {
            return false;
        };
        self.tip_distance(hand, frame_width, frame_height) < self.threshold_px
    }

    /// Euclidean distance between thumb and index tips in frame pixels.
    pub fn tip_distance(&self, hand: &Hand, frame_width: u32, frame_height: u32) -> f64 {
        let (tx, ty) = hand.thumb_tip().to_pixel(frame_width, frame_height);
        let (ix, iy) = hand.index_tip().to_pixel(frame_width, frame_height);
        let dx = (ix - tx) as f64;
        let dy = (iy - ty) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{Landmark, hand_with_tips};

    #[test]
    fn no_hands_is_open() {
        assert!(!PinchClassifier::default().classify(&[], 640, 480));
    }

    #[test]
    fn touching_tips_are_pinched() {
        let hand = hand_with_tips(Landmark::new(0.50, 0.50), Landmark::new(0.52, 0.51));
        assert!(PinchClassifier::default().classify(&[hand], 640, 480));
    }

    #[test]
    fn spread_tips_are_open() {
        let hand = hand_with_tips(Landmark::new(0.30, 0.50), Landmark::new(0.50, 0.30));
        assert!(!PinchClassifier::default().classify(&[hand], 640, 480));
    }

    #[test]
    fn distance_is_measured_in_frame_pixels() {
        // 0.1 of a 640-wide frame is 64 px, 0.1 of a 400-wide one is 40 px.
        let hand = hand_with_tips(Landmark::new(0.2, 0.5), Landmark::new(0.3, 0.5));
        let classifier = PinchClassifier::default();
        assert!(!classifier.classify(std::slice::from_ref(&hand), 640, 480));
        assert!(classifier.classify(&[hand], 400, 480));
    }

    #[test]
    fn threshold_is_strict() {
        // 3-4-5 triangle: exactly 50 px apart.
        let hand = hand_with_tips(Landmark::new(0.0, 0.0), Landmark::new(0.3, 0.4));
        let classifier = PinchClassifier::new(50.0);
        assert_eq!(classifier.tip_distance(&hand, 100, 100), 50.0);
        assert!(!classifier.classify(std::slice::from_ref(&hand), 100, 100));
        assert!(PinchClassifier::new(50.5).classify(&[hand], 100, 100));
    }

    #[test]
    fn only_first_hand_is_considered() {
        let open = hand_with_tips(Landmark::new(0.1, 0.1), Landmark::new(0.9, 0.9));
        let pinched = hand_with_tips(Landmark::new(0.5, 0.5), Landmark::new(0.5, 0.5));
        let classifier = PinchClassifier::default();
        let both = [open.clone(), pinched.clone()];
        assert!(!classifier.classify(&both, 640, 480));
        assert!(classifier.classify(&[pinched, open], 640, 480));
    }
}
