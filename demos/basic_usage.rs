//! # olap-memstore 使用案例
//!
//! 1. 构造一份 5 行 4 列的数据
//! 2. 分别以四种引擎装载
//! 3. 执行四个固定查询并对比结果
//! 4. 修改索引列后校验索引一致性
//! 5. 通过 SharedTable 在多线程间共享一张表

use olap_memstore::{EngineKind, MemoryLoader, SharedTable, Table, TableConfig};
use std::thread;

fn main() -> olap_memstore::Result<()> {
    println!("═══════════════════════════════════════════════════════════");
    println!("   olap-memstore 演示                                       ");
    println!("═══════════════════════════════════════════════════════════\n");

    // =========================================================================
    // 1. 数据
    // =========================================================================
    let loader = MemoryLoader::from_columns(&[
        vec![10, 5, 8, 3, 12],
        vec![1, 9, 2, 7, 4],
        vec![5, 1, 9, 2, 0],
        vec![0, 0, 0, 0, 0],
    ])?;
    println!("【1】数据：5 行 × 4 列\n");

    // =========================================================================
    // 2-3. 四种引擎 + 固定查询
    // =========================================================================
    println!("【2】四种引擎执行固定查询 ...");
    let configs = [
        TableConfig::new(EngineKind::Row),
        TableConfig::new(EngineKind::Column),
        TableConfig::new(EngineKind::Indexed).with_index_column(0),
        TableConfig::new(EngineKind::Custom),
    ];
    for cfg in &configs {
        let mut table = cfg.open()?;
        table.load(&loader)?;
        let sum      = table.column_sum()?;
        let pred_sum = table.predicated_column_sum(4, 5)?;
        let all_sum  = table.predicated_all_columns_sum(6)?;
        let updated  = table.predicated_update(6)?;
        println!(
            "    {:<8} sum={sum:<4} pred_sum(4,5)={pred_sum:<4} all_sum(6)={all_sum:<4} update(6)={updated}",
            table.name(),
        );
    }
    println!();

    // =========================================================================
    // 4. 写索引列 + 一致性校验
    // =========================================================================
    println!("【3】写入 col0 / col1 / col2 后校验索引 ...");
    let mut custom = TableConfig::new(EngineKind::Custom).open()?;
    custom.load(&loader)?;
    custom.put_int_field(1, 0, 100)?;
    custom.put_int_field(0, 1, 8)?;
    custom.put_int_field(0, 2, 4)?;
    custom.verify_integrity()?;
    println!("    column_sum            = {}", custom.column_sum()?);
    println!("    predicated_column_sum = {}", custom.predicated_column_sum(4, 5)?);
    println!("    ✓ 索引与缓冲区一致\n");

    // =========================================================================
    // 5. 多线程共享
    // =========================================================================
    println!("【4】SharedTable 多线程写入 ...");
    let shared = SharedTable::new(TableConfig::new(EngineKind::Indexed).with_index_column(1).open()?);
    shared.load(&loader)?;
    let workers: Vec<_> = (0..5)
        .map(|row| {
            let t = shared.clone();
            thread::spawn(move || t.put_int_field(row, 1, 10 + row as i32))
        })
        .collect();
    for w in workers {
        w.join().expect("worker panicked")?;
    }
    shared.verify_integrity()?;
    println!("    predicated_column_sum(4,5) = {}", shared.predicated_column_sum(4, 5)?);
    println!("    ✓ OK");
    Ok(())
}
