use crate::shape::Shape;

/// Taller trees don't fit on a terminal.
pub const MAX_PRINT_HEIGHT: usize = 6;

const FILLER: char = '~';

/// Level-order ASCII drawing of `shape`, root line first. Values are
/// zero-padded to `width` and empty slots are drawn as `width` filler
/// characters. Each level is followed by a blank line.
pub fn render(shape: &Shape, width: usize) -> String {
    if shape.is_empty() {
        return "Tree is empty, can't print\n".to_string();
    }
    let height = shape.height();
    if height > MAX_PRINT_HEIGHT {
        return "Tree too large to print\n".to_string();
    }

    let mut out = String::new();
    for level in (1..=height).rev() {
        let leading = 1 << (level - 1);
        let between = (1 << level) - 1;
        let count = 1 << (height - level);
        render_line(&mut out, shape, width, leading, between, count);
    }
    out
}

fn render_line(
    out: &mut String,
    shape: &Shape,
    width: usize,
    leading: usize,
    between: usize,
    count: usize,
) {
    push_gap(out, leading, width);
    for index in 0..count {
        match slot_at(shape, index, count) {
            Some(value) => out.push_str(&format!("{:0width$}", value, width = width)),
            None => out.extend(std::iter::repeat_n(FILLER, width)),
        }
        push_gap(out, between, width);
    }
    out.push_str("\n\n");
}

/// The value in slot `index` of a level with `count` slots. The bits of
/// `index`, most significant first, spell the path: 0 is left, 1 is right.
fn slot_at(shape: &Shape, index: usize, count: usize) -> Option<i64> {
    let mut current = shape;
    let mut bit = count / 2;
    while bit >= 1 {
        current = if index & bit == 0 {
            current.left()?
        } else {
            current.right()?
        };
        bit /= 2;
    }
    current.value()
}

fn push_gap(out: &mut String, gaps: usize, width: usize) {
    out.extend(std::iter::repeat_n(' ', gaps * width));
}
