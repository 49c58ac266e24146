//! Scene graph: an ordered list of typed drawing primitives.
//!
//! Recipes build a [`Scene`] through [`SceneBuilder`] in a single pass
//! (axes, then gridlines and ticks, then data marks, then title and legend);
//! later primitives draw over earlier ones. The backend in [`crate::svg`]
//! serializes the finished scene without inspecting it.

use plotters::style::RGBColor;

use crate::palette::{parse_color, to_hex};

/// Style classes declared in the scene's style block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Axis,
    Grid,
    Label,
    Title,
    Tick,
    Bar,
    Line,
    Cell,
    Legend,
    Note,
    Country,
}

impl Class {
    pub fn as_str(&self) -> &'static str {
        match self {
            Class::Axis => "axis",
            Class::Grid => "grid",
            Class::Label => "label",
            Class::Title => "title",
            Class::Tick => "tick",
            Class::Bar => "bar",
            Class::Line => "line",
            Class::Cell => "cell",
            Class::Legend => "legend",
            Class::Note => "note",
            Class::Country => "country",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        class: Option<Class>,
        fill: Option<RGBColor>,
        stroke: Option<RGBColor>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        class: Class,
    },
    Path {
        points: Vec<(f64, f64)>,
        class: Class,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        class: Class,
        anchor: Anchor,
        fill: Option<RGBColor>,
    },
}

/// Colors that can be overridden from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStyle {
    pub background: RGBColor,
    pub bar: RGBColor,
    pub line: RGBColor,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            bar: RGBColor(0x4c, 0x78, 0xa8),
            line: RGBColor(0xe4, 0x57, 0x56),
        }
    }
}

impl SceneStyle {
    /// Build from optional color strings; unparseable strings keep the default.
    pub fn from_strings(bar: Option<&str>, line: Option<&str>) -> Self {
        let mut style = Self::default();
        if let Some(c) = bar.and_then(parse_color) {
            style.bar = c;
        }
        if let Some(c) = line.and_then(parse_color) {
            style.line = c;
        }
        style
    }

    /// CSS rules for every [`Class`].
    pub fn css(&self) -> String {
        let font = "font-family: Arial, sans-serif;";
        [
            ".axis { stroke:#333; stroke-width:1; fill:none; }".to_string(),
            ".grid { stroke:#ddd; stroke-width:1; fill:none; }".to_string(),
            format!(".label {{ {} font-size:12px; fill:#111; }}", font),
            format!(".title {{ {} font-size:16px; font-weight:bold; fill:#111; }}", font),
            format!(".tick {{ {} font-size:10px; fill:#333; }}", font),
            format!(".bar {{ fill:{}; }}", to_hex(self.bar)),
            format!(".line {{ stroke:{}; stroke-width:2; fill:none; }}", to_hex(self.line)),
            ".cell { stroke:#fff; stroke-width:1; }".to_string(),
            format!(".legend {{ {} font-size:11px; fill:#111; }}", font),
            format!(".note {{ {} font-size:10px; fill:#666; }}", font),
            format!(".country {{ {} font-size:9px; fill:#111; }}", font),
        ]
        .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub style: SceneStyle,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn paths(&self) -> impl Iterator<Item = &Vec<(f64, f64)>> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Path { points, .. } => Some(points),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    pub fn count_class(&self, wanted: Class) -> usize {
        self.primitives
            .iter()
            .filter(|p| match p {
                Primitive::Rect { class, .. } => *class == Some(wanted),
                Primitive::Line { class, .. }
                | Primitive::Path { class, .. }
                | Primitive::Text { class, .. } => *class == wanted,
            })
            .count()
    }
}

/// Pixel rectangle holding the data marks. `bottom > top` in SVG coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PlotArea {
    /// Area inset by `margin` on every side.
    pub fn inset(width: u32, height: u32, margin: f64) -> Self {
        Self {
            left: margin,
            right: width as f64 - margin,
            top: margin,
            bottom: height as f64 - margin,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.left, self.right)
    }

    /// Y pixel range with larger data values drawn higher.
    pub fn y_range(&self) -> (f64, f64) {
        (self.bottom, self.top)
    }
}

pub struct SceneBuilder {
    width: u32,
    height: u32,
    style: SceneStyle,
    primitives: Vec<Primitive>,
}

impl SceneBuilder {
    /// Start a scene with an opaque background rectangle.
    pub fn new(width: u32, height: u32, style: SceneStyle) -> Self {
        let background = Primitive::Rect {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
            class: None,
            fill: Some(style.background),
            stroke: None,
        };
        Self {
            width,
            height,
            style,
            primitives: vec![background],
        }
    }

    pub fn push(&mut self, primitive: Primitive) -> &mut Self {
        self.primitives.push(primitive);
        self
    }

    /// X axis along the bottom and y axis along the left edge of `area`.
    pub fn axes(&mut self, area: &PlotArea) -> &mut Self {
        self.line(area.left, area.bottom, area.right, area.bottom, Class::Axis);
        self.line(area.left, area.bottom, area.left, area.top, Class::Axis)
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, class: Class) -> &mut Self {
        self.push(Primitive::Line { x1, y1, x2, y2, class })
    }

    pub fn horizontal_gridline(&mut self, area: &PlotArea, y: f64) -> &mut Self {
        self.line(area.left, y, area.right, y, Class::Grid)
    }

    pub fn vertical_gridline(&mut self, area: &PlotArea, x: f64) -> &mut Self {
        self.line(x, area.bottom, x, area.top, Class::Grid)
    }

    /// Label under the x axis at pixel `x`.
    pub fn x_tick(&mut self, area: &PlotArea, x: f64, label: &str) -> &mut Self {
        self.text(x, area.bottom + 14.0, label, Class::Tick, Anchor::Middle)
    }

    /// Label left of the y axis at pixel `y`.
    pub fn y_tick(&mut self, area: &PlotArea, y: f64, label: &str) -> &mut Self {
        self.text(area.left - 6.0, y + 4.0, label, Class::Tick, Anchor::End)
    }

    /// Bar spanning pixel rows `y_value` to `y_base`, whichever is higher.
    pub fn bar(&mut self, x_center: f64, width: f64, y_value: f64, y_base: f64) -> &mut Self {
        self.push(Primitive::Rect {
            x: x_center - width / 2.0,
            y: y_value.min(y_base),
            width,
            height: (y_base - y_value).abs(),
            class: Some(Class::Bar),
            fill: None,
            stroke: None,
        })
    }

    pub fn polyline(&mut self, points: Vec<(f64, f64)>) -> &mut Self {
        self.push(Primitive::Path {
            points,
            class: Class::Line,
        })
    }

    pub fn cell(&mut self, x: f64, y: f64, width: f64, height: f64, fill: RGBColor) -> &mut Self {
        self.push(Primitive::Rect {
            x,
            y,
            width,
            height,
            class: Some(Class::Cell),
            fill: Some(fill),
            stroke: None,
        })
    }

    /// Unclassed filled tile with a white outline.
    pub fn tile(&mut self, x: f64, y: f64, size: f64, fill: RGBColor) -> &mut Self {
        self.push(Primitive::Rect {
            x,
            y,
            width: size,
            height: size,
            class: None,
            fill: Some(fill),
            stroke: Some(RGBColor(255, 255, 255)),
        })
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, class: Class, anchor: Anchor) -> &mut Self {
        self.push(Primitive::Text {
            x,
            y,
            content: content.to_string(),
            class,
            anchor,
            fill: None,
        })
    }

    pub fn colored_text(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        class: Class,
        fill: RGBColor,
    ) -> &mut Self {
        self.push(Primitive::Text {
            x,
            y,
            content: content.to_string(),
            class,
            anchor: Anchor::Middle,
            fill: Some(fill),
        })
    }

    /// Centered title at the top of the scene.
    pub fn title(&mut self, content: &str) -> &mut Self {
        let x = self.width as f64 / 2.0;
        self.text(x, 24.0, content, Class::Title, Anchor::Middle)
    }

    /// Legend swatch with its label to the right.
    pub fn legend_entry(&mut self, x: f64, y: f64, fill: RGBColor, label: &str) -> &mut Self {
        self.push(Primitive::Rect {
            x,
            y,
            width: 18.0,
            height: 14.0,
            class: None,
            fill: Some(fill),
            stroke: Some(RGBColor(255, 255, 255)),
        });
        self.text(x + 24.0, y + 12.0, label, Class::Tick, Anchor::Start)
    }

    pub fn finish(self) -> Scene {
        Scene {
            width: self.width,
            height: self.height,
            style: self.style,
            primitives: self.primitives,
        }
    }
}
