//! End-to-end shape checks across the two halves of the pipeline: the
//! outbound serialization fed to the model and the inbound spec-to-request
//! conversion of what the model sends back.

use rewrite_module::notion::{
    block_specs_to_requests, blocks_to_markdown, Block, BlockKind, BlockSpec, ExpandedBlock,
};

fn leaf(id: &str, kind: BlockKind) -> ExpandedBlock {
    ExpandedBlock {
        block: Block {
            id: id.to_string(),
            has_children: false,
            kind,
        },
        children: Vec::new(),
    }
}

fn tree() -> Vec<ExpandedBlock> {
    vec![
        leaf(
            "b1",
            BlockKind::Heading1 {
                text: "Overview".to_string(),
            },
        ),
        leaf(
            "b2",
            BlockKind::Paragraph {
                text: "Intro paragraph.".to_string(),
            },
        ),
        ExpandedBlock {
            block: Block {
                id: "b3".to_string(),
                has_children: true,
                kind: BlockKind::Toggle {
                    title: "Details".to_string(),
                },
            },
            children: vec![leaf(
                "b4",
                BlockKind::BulletedListItem {
                    text: "one point".to_string(),
                },
            )],
        },
    ]
}

#[test]
fn serialized_tree_carries_every_block_for_the_model() {
    let markdown = blocks_to_markdown(&tree());

    assert!(markdown.contains("# Overview"));
    assert!(markdown.contains("Intro paragraph."));
    assert!(markdown.contains("<toggle title=\"Details\">"));
    assert!(markdown.contains("  - one point"));
    assert!(markdown.contains("</toggle>"));

    // Order is preserved top to bottom.
    let heading = markdown.find("# Overview").unwrap();
    let intro = markdown.find("Intro paragraph.").unwrap();
    let toggle = markdown.find("<toggle").unwrap();
    assert!(heading < intro && intro < toggle);
}

#[test]
fn equivalent_spec_tree_rebuilds_the_same_block_shapes() {
    let specs = vec![
        BlockSpec::Heading1 {
            text: "Overview".to_string(),
        },
        BlockSpec::Paragraph {
            text: "Intro paragraph.".to_string(),
        },
        BlockSpec::Toggle {
            title: Some("Details".to_string()),
            children: vec![BlockSpec::BulletedListItem {
                text: "one point".to_string(),
                children: Vec::new(),
            }],
        },
    ];

    let requests = block_specs_to_requests(&specs);
    assert_eq!(requests.len(), 3);

    assert_eq!(requests[0]["type"], "heading_1");
    assert_eq!(
        requests[0]["heading_1"]["rich_text"][0]["text"]["content"],
        "Overview"
    );

    assert_eq!(requests[1]["type"], "paragraph");
    assert_eq!(
        requests[1]["paragraph"]["rich_text"][0]["text"]["content"],
        "Intro paragraph."
    );

    assert_eq!(requests[2]["type"], "toggle");
    assert_eq!(
        requests[2]["toggle"]["rich_text"][0]["text"]["content"],
        "Details"
    );
    let nested = requests[2]["toggle"]["children"].as_array().unwrap();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0]["type"], "bulleted_list_item");
    assert_eq!(
        nested[0]["bulleted_list_item"]["rich_text"][0]["text"]["content"],
        "one point"
    );
}

#[test]
fn model_spec_json_deserializes_and_converts_in_one_pass() {
    let raw = serde_json::json!([
        { "type": "heading_2", "text": "Findings" },
        { "type": "to_do", "text": "follow up", "checked": false },
        { "type": "code", "text": "cargo run", "language": "bash" }
    ]);
    let specs: Vec<BlockSpec> = serde_json::from_value(raw).unwrap();
    let requests = block_specs_to_requests(&specs);

    assert_eq!(requests[0]["type"], "heading_2");
    assert_eq!(requests[1]["to_do"]["checked"], false);
    assert_eq!(requests[2]["code"]["language"], "bash");
}
