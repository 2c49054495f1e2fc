pub const COLOR_PALETTE: [&str; 8] = [
    "#ff0000", "#0000ff", "#008000", "#808080", "#ff00ff", "#00ffff", "#ffa500", "#ffc0cb",
];

pub const SHAPE_PALETTE: [&str; 4] = ["circle", "square", "cross", "dot"];

/// Hands out a different default each time, cycling through a fixed list.
#[derive(Debug, Clone)]
pub struct Palette<T> {
    items: Vec<T>,
    next: usize,
}

impl<T: Clone> Palette<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, next: 0 }
    }

    pub fn next_value(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let item = self.items[self.next % self.items.len()].clone();
        self.next = self.next.wrapping_add(1);
        Some(item)
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Palette<String> {
    pub fn colors() -> Self {
        Self::new(COLOR_PALETTE.iter().map(|c| c.to_string()).collect())
    }

    pub fn shapes() -> Self {
        Self::new(SHAPE_PALETTE.iter().map(|s| s.to_string()).collect())
    }
}
