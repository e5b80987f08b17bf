//! Property tests: random editing sessions keep the document well formed.

use std::cell::RefCell;
use std::rc::Rc;

use poster_core::{
    CanvasResult, Command, Editor, Element, ElementId, ElementKind, ImageInfo, ImageResolver,
    ReorderDirection, ShapeType,
};
use proptest::prelude::*;

struct SquareImages;

impl ImageResolver for SquareImages {
    fn resolve(&self, _src: &str) -> CanvasResult<ImageInfo> {
        Ok(ImageInfo {
            width: 64,
            height: 64,
        })
    }
}

/// An operation whose target is picked from the IDs seen so far.
#[derive(Debug, Clone)]
enum Op {
    AddShape(ShapeType),
    AddText,
    AddImage,
    AddPlaced(ShapeType, f32, f32, f32),
    Delete(usize),
    Select(Option<usize>),
    SelectAt(f32, f32),
    Reorder(usize, ReorderDirection),
    Transform(usize, f32, f32, f32),
    Drag(usize, f32, f32),
    BeginEdit(usize),
    CommitEdit(usize),
    Clear,
}

fn arb_shape_type() -> impl Strategy<Value = ShapeType> {
    prop_oneof![
        Just(ShapeType::Rect),
        Just(ShapeType::Circle),
        Just(ShapeType::Triangle),
        Just(ShapeType::Star),
    ]
}

fn arb_direction() -> impl Strategy<Value = ReorderDirection> {
    prop_oneof![
        Just(ReorderDirection::Up),
        Just(ReorderDirection::Down),
        Just(ReorderDirection::Top),
        Just(ReorderDirection::Bottom),
    ]
}

fn arb_scale() -> impl Strategy<Value = f32> {
    prop_oneof![
        -2.0f32..4.0f32,
        Just(0.0f32),
        Just(f32::NAN),
        Just(f32::INFINITY),
    ]
}

fn arb_coordinate() -> impl Strategy<Value = f32> {
    prop_oneof![
        -1000.0f32..1000.0f32,
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_shape_type().prop_map(Op::AddShape),
        Just(Op::AddText),
        Just(Op::AddImage),
        (arb_shape_type(), arb_coordinate(), arb_coordinate(), arb_coordinate())
            .prop_map(|(shape, x, y, r)| Op::AddPlaced(shape, x, y, r)),
        any::<usize>().prop_map(Op::Delete),
        any::<Option<usize>>().prop_map(Op::Select),
        (0.0f32..800.0, 0.0f32..600.0).prop_map(|(x, y)| Op::SelectAt(x, y)),
        (any::<usize>(), arb_direction()).prop_map(|(i, d)| Op::Reorder(i, d)),
        (any::<usize>(), arb_scale(), arb_scale(), -720.0f32..720.0)
            .prop_map(|(i, sx, sy, r)| Op::Transform(i, sx, sy, r)),
        (any::<usize>(), -100.0f32..900.0, -100.0f32..700.0)
            .prop_map(|(i, x, y)| Op::Drag(i, x, y)),
        any::<usize>().prop_map(Op::BeginEdit),
        any::<usize>().prop_map(Op::CommitEdit),
        Just(Op::Clear),
    ]
}

fn pick(ids: &[ElementId], index: usize) -> ElementId {
    if ids.is_empty() {
        ElementId::new()
    } else {
        ids[index % ids.len()]
    }
}

fn to_command(op: Op, ids: &[ElementId]) -> Command {
    match op {
        Op::AddShape(shape_type) => Command::AddShape {
            shape_type,
            id: None,
        },
        Op::AddText => Command::AddText {
            text: "Double-click to edit".to_string(),
            id: None,
        },
        Op::AddImage => Command::AddImage {
            src: "photo.png".to_string(),
            id: None,
        },
        Op::AddPlaced(shape_type, x, y, rotation) => Command::Add {
            element: Element::shape(shape_type)
                .with_position(x, y)
                .with_rotation(rotation),
        },
        Op::Delete(i) => Command::Delete { id: pick(ids, i) },
        Op::Select(i) => Command::Select {
            id: i.map(|i| pick(ids, i)),
        },
        Op::SelectAt(x, y) => Command::SelectAt { x, y },
        Op::Reorder(i, direction) => Command::Reorder {
            id: pick(ids, i),
            direction,
        },
        Op::Transform(i, scale_x, scale_y, rotation) => Command::Transform {
            id: pick(ids, i),
            scale_x,
            scale_y,
            x: 10.0,
            y: 10.0,
            rotation,
        },
        Op::Drag(i, x, y) => Command::Drag {
            id: pick(ids, i),
            x,
            y,
        },
        Op::BeginEdit(i) => Command::BeginTextEdit { id: pick(ids, i) },
        Op::CommitEdit(i) => Command::CommitTextEdit {
            id: pick(ids, i),
            text: format!("edit {i}"),
        },
        Op::Clear => Command::Clear,
    }
}

proptest! {
    #[test]
    fn prop_random_sessions_keep_document_well_formed(
        ops in prop::collection::vec(arb_op(), 0..40)
    ) {
        let mut editor = Editor::default();
        let published = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&published);
        editor.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.revision));

        let mut ids = Vec::new();
        for op in ops {
            let before = editor.document().revision();
            let command = to_command(op, &ids);
            let outcome = editor.apply(command, &SquareImages).expect("command");
            if let poster_core::CommandOutcome::Added(id) = outcome {
                ids.push(id);
            }

            let doc = editor.document();
            for (position, element) in doc.elements().iter().enumerate() {
                prop_assert_eq!(element.transform.z_index, position);
                prop_assert!(element.transform.width >= element.min_size());
                prop_assert!(element.transform.height >= element.min_size());
                prop_assert!(element.transform.x.is_finite());
                prop_assert!(element.transform.y.is_finite());
                prop_assert!(element.transform.rotation.is_finite());
                if let ElementKind::Text { font_size, .. } = &element.kind {
                    prop_assert!(*font_size >= 8.0);
                }
            }
            if let Some(selected) = doc.snapshot().selected_id {
                prop_assert!(doc.get(selected).is_some());
            }
            if let Some(session) = editor.text_edit_session() {
                prop_assert!(doc.get(session.id).is_some());
            }
            if doc.revision() != before {
                prop_assert_eq!(published.borrow().last().copied(), Some(doc.revision()));
            }
        }

        let revisions = published.borrow();
        prop_assert!(revisions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
