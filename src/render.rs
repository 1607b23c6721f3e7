// Renders a decoded schedule as a Gantt chart, one column per machine with
// time flowing downwards.

use svg::{
    node::element::{
        path::Data, Group, LinearGradient, Path, Rectangle, Stop, Style, Text, Title, SVG,
    },
    Document,
};

use crate::decoding::GanttData;

const SCALE_MARGIN: usize = 50; // px
const LEFT_MARGIN: usize = SCALE_MARGIN + 20; // px
const TOP_HEADER_MARGIN: usize = 50; // px
const TOP_MARGIN: usize = TOP_HEADER_MARGIN + 20; // px
const RIGHT_MARGIN: usize = 30; // px
const BOTTOM_MARGIN: usize = 20; // px
const MACHINE_WIDTH: usize = 150; // px
const TIME_SCALE: usize = 15; // px for each unit of processing time
const MACHINE_SPACING: usize = 10; // px

/// Fill colors cycled over jobs in first-encounter order.
const JOB_COLORS: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

pub fn render_schedule(gantt: &GanttData) -> String {
    // Create the linear gradient for the background
    let gradient = LinearGradient::new()
        .set("id", "background")
        .set("y1", "0")
        .set("y2", "1")
        .set("x1", "0")
        .set("x2", "0")
        .add(Stop::new().set("stop-color", "#eeeeee").set("offset", "5%"))
        .add(
            Stop::new()
                .set("stop-color", "#b0b0ee")
                .set("offset", "95%"),
        );

    let makespan = gantt
        .iter()
        .flat_map(|(_, operations)| operations.iter().map(|&(_, end, _)| end))
        .max()
        .unwrap_or(0)
        .max(0) as usize;

    let document = gantt
        .iter()
        .enumerate()
        .map(|(index, (name, _))| create_machine_header(index, name))
        .fold(
            Document::new()
                .set("version", "1.1")
                .set("xmlns", "http://www.w3.org/2000/svg")
                .set("xmlns:svg", "http://www.w3.org/2000/svg")
                .add(gradient)
                .add(Style::new(
                    r#"
    text { font-family:monospace; font-size:10px; fill:black; }
    #title { text-anchor:middle; font-size:25px; }
    .machine-header { text-anchor:middle; font-size:17px; }
    .operation-box { stroke-width:1; stroke:black; }
    .operation-label { text-anchor:middle; dominant-baseline:middle; font-size:12px; }
    .scale-label { text-anchor:end; dominant-baseline:middle; font-size:10px; }
    "#,
                ))
                // background
                .add(
                    Rectangle::new()
                        .set("x", 0)
                        .set("y", 0)
                        .set("width", "100%")
                        .set("height", "100%")
                        .set("fill", "url(#background)"),
                )
                // title
                .add(
                    Text::new(format!("Schedule (makespan {makespan})"))
                        .set("id", "title")
                        .set("x", "50%")
                        .set("y", 24),
                ),
            |doc, header| doc.add(header),
        );

    let document = add_operations_to_doc(document, gantt);
    let height = TOP_MARGIN + makespan * TIME_SCALE;

    let body = document
        .add(create_time_scale(height))
        .set(
            "width",
            LEFT_MARGIN + gantt.len() * (MACHINE_WIDTH + MACHINE_SPACING) + RIGHT_MARGIN,
        )
        .set("height", height + BOTTOM_MARGIN)
        .to_string();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
{body}"#
    )
}

fn add_operations_to_doc(document: SVG, gantt: &GanttData) -> SVG {
    // Jobs are colored in the order their labels first appear.
    let mut job_keys: Vec<String> = Vec::new();
    let mut color_of = |label: &str| {
        let key = label.split('-').next().unwrap_or(label).to_string();
        let index = match job_keys.iter().position(|seen| *seen == key) {
            Some(index) => index,
            None => {
                job_keys.push(key);
                job_keys.len() - 1
            }
        };
        JOB_COLORS[index % JOB_COLORS.len()]
    };

    gantt
        .iter()
        .enumerate()
        .fold(document, |doc, (machine, (_, operations))| {
            let x = LEFT_MARGIN + machine * (MACHINE_WIDTH + MACHINE_SPACING);
            operations
                .iter()
                .fold(doc, |doc, &(start, end, ref label)| {
                    let color = color_of(label);
                    add_operation_to_doc(doc, x, start, end, label, color)
                })
        })
}

fn add_operation_to_doc(
    document: SVG,
    x: usize,
    start: i32,
    end: i32,
    label: &str,
    color: &str,
) -> SVG {
    let y = TOP_MARGIN + start.max(0) as usize * TIME_SCALE;
    let w = MACHINE_WIDTH;
    let h = (end - start).max(0) as usize * TIME_SCALE;
    let operation_box = Rectangle::new()
        .set("x", x)
        .set("y", y)
        .set("width", w)
        .set("height", h)
        .set("fill", color)
        .set("class", "operation-box");

    let operation_label = Text::new(label.to_string())
        .set("x", x + w / 2)
        .set("y", y + h / 2) // Centered on the rectangle
        .set("class", "operation-label");

    let tooltip = Title::new(format!("{label}\n\nstart: {start} s\nend: {end} s"));

    let group = Group::new()
        .add(operation_box)
        .add(operation_label)
        .add(tooltip);

    document.add(group)
}

fn create_machine_header(i: usize, name: &str) -> Text {
    let x = LEFT_MARGIN + i * (MACHINE_WIDTH + MACHINE_SPACING) + (MACHINE_WIDTH / 2);
    let y = TOP_HEADER_MARGIN;
    Text::new(name.to_string())
        .set("x", x)
        .set("y", y)
        .set("width", "100%")
        .set("height", "100%")
        .set("class", "machine-header")
}

fn create_time_scale(height: usize) -> Group {
    (0..=(height - TOP_MARGIN) / TIME_SCALE)
        .map(|t| {
            let scaled_t = t * TIME_SCALE;
            let is_big = scaled_t % (5 * TIME_SCALE) == 0;
            let width = if is_big { 10 } else { 5 };
            let line = Group::new().add(create_line(
                SCALE_MARGIN - width,
                TOP_MARGIN + scaled_t,
                width,
                0,
            ));
            if is_big {
                line.add(
                    Text::new(t.to_string())
                        .set("x", SCALE_MARGIN - 15)
                        .set("y", TOP_MARGIN + scaled_t)
                        .set("class", "scale-label"),
                )
            } else {
                line
            }
        })
        .fold(
            Group::new().add(create_line(SCALE_MARGIN, TOP_MARGIN, 0, height - TOP_MARGIN)),
            |group, line| group.add(line),
        )
}

fn create_line(x: usize, y: usize, w: usize, h: usize) -> Path {
    Path::new()
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", 2)
        .set("d", Data::new().move_to((x, y)).line_by((w, h)))
}
