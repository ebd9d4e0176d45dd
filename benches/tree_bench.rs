//! Quick benchmark for tree building, queries and full rerun cycles

use std::sync::Arc;
use std::time::Instant;

use apptest::proto::{BlockProto, ElementProto, ForwardMsg, TextProto};
use apptest::{parse_tree_from_messages, AppTest, AppTestConfig, SessionSnapshot};
use serde_json::json;

fn text(path: Vec<usize>, body: String) -> ForwardMsg {
    ForwardMsg::new_element(
        path,
        ElementProto::Text(TextProto {
            body,
            ..Default::default()
        }),
    )
}

/// `blocks` expanders with `per_block` text children each, last block first
fn stream(blocks: usize, per_block: usize) -> Vec<ForwardMsg> {
    let mut msgs = Vec::with_capacity(blocks * (per_block + 1));
    for b in (0..blocks).rev() {
        msgs.push(ForwardMsg::add_block(
            vec![0, b],
            BlockProto::Expandable(Default::default()),
        ));
        for i in 0..per_block {
            msgs.push(text(vec![0, b, i], format!("{b}.{i}")));
        }
    }
    msgs
}

fn main() -> anyhow::Result<()> {
    println!("Tree Build Performance Test");
    println!("===========================\n");

    for (blocks, per_block) in [(10, 10), (100, 10), (100, 100)] {
        let msgs = stream(blocks, per_block);
        let iterations = 200;
        let start = Instant::now();

        for _ in 0..iterations {
            parse_tree_from_messages(&msgs, Arc::new(SessionSnapshot::new()))?;
        }

        let elapsed = start.elapsed();
        println!("Messages: {}", msgs.len());
        println!("  Time for {} iterations: {:?}", iterations, elapsed);
        println!("  Per build: {:?}\n", elapsed / iterations);
    }

    println!("Query Performance");
    println!("=================\n");

    let tree = parse_tree_from_messages(&stream(100, 100), Arc::new(SessionSnapshot::new()))?;
    let iterations = 1_000;

    let start = Instant::now();
    for _ in 0..iterations {
        let texts = tree.text();
        assert_eq!(texts.len(), 10_000);
    }
    println!("text() over 10k elements: {:?} per query", start.elapsed() / iterations);

    let start = Instant::now();
    for _ in 0..iterations {
        let expanders = tree.expanders();
        assert_eq!(expanders[50].text().len(), 100);
    }
    println!("scoped text() in one expander: {:?} per query\n", start.elapsed() / iterations);

    println!("Rerun Cycle Performance");
    println!("=======================\n");

    let at = AppTest::from_script(|ctx| {
        let options = [json!("a"), json!("b"), json!("c")];
        for i in 0..50 {
            let key = format!("r{i}");
            ctx.radio(&format!("radio {i}"), &options, Some(0), Some(&key))?;
        }
        Ok(())
    })
    .with_config(AppTestConfig::testing());

    let mut tree = at.run()?;
    let iterations = 50;
    let start = Instant::now();
    for i in 0..iterations {
        tree.radio()[i % 50].set_value("b");
        tree = tree.run()?;
    }
    let elapsed = start.elapsed();
    println!("Rerun with 50 radios: {:?} per cycle", elapsed / iterations as u32);
    at.join();

    Ok(())
}
