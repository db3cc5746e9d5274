use proptest::prelude::*;

use pushkind_menu::domain::category::Category;
use pushkind_menu::repository::CategoryRepository;
use pushkind_menu::repository::ordering::is_dense;
use pushkind_menu::store::InMemoryCategoryStore;

mod common;

#[derive(Debug, Clone)]
enum Op {
    Create,
    Remove(usize),
    Reorder(usize, usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Create),
        1 => (0..16usize).prop_map(Op::Remove),
        3 => (0..16usize, 0..20usize).prop_map(|(from, to)| Op::Reorder(from, to)),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

fn repo_with(count: usize) -> (tokio::runtime::Runtime, CategoryRepository<InMemoryCategoryStore>) {
    let rt = runtime();
    let repo = CategoryRepository::new(InMemoryCategoryStore::new(), common::establishment(1));
    rt.block_on(async {
        for i in 0..count {
            let text = format!("Kategori {i}");
            repo.create(common::name(&[("tr", text.as_str())]), true)
                .await
                .expect("create");
        }
    });
    (rt, repo)
}

fn stored(repo: &CategoryRepository<InMemoryCategoryStore>) -> Vec<Category> {
    repo.store().rows(repo.establishment_id())
}

proptest! {
    #[test]
    fn prop_ordering_stays_dense(ops in prop::collection::vec(arb_op(), 1..40)) {
        let (rt, repo) = repo_with(3);

        for op in ops {
            let snapshot = repo.snapshot();
            rt.block_on(async {
                match op {
                    Op::Create => {
                        repo.create(common::name(&[("en", "New")]), true).await.map(|_| ())
                    }
                    Op::Remove(i) if !snapshot.is_empty() => {
                        let id = snapshot.items()[i % snapshot.len()].id;
                        repo.remove(id).await
                    }
                    Op::Reorder(i, to) if !snapshot.is_empty() => {
                        let id = snapshot.items()[i % snapshot.len()].id;
                        repo.reorder(id, to).await.map(|_| ())
                    }
                    _ => Ok(()),
                }
            })
            .expect("in-memory mutations succeed");

            let current = repo.snapshot();
            prop_assert!(is_dense(current.items()));
            let rows = stored(&repo);
            prop_assert_eq!(current.items(), rows.as_slice());
        }
    }

    #[test]
    fn prop_move_is_undone_by_inverse_move(
        count in 1..10usize,
        from in 0..10usize,
        to in 0..10usize,
    ) {
        let (rt, repo) = repo_with(count);
        let from = from % count;
        let before = repo.snapshot();
        let id = before.items()[from].id;

        let landed = rt.block_on(repo.reorder(id, to)).expect("reorder");
        prop_assert_eq!(landed, to.min(count - 1));
        rt.block_on(repo.reorder(id, from)).expect("reorder back");

        let after = repo.snapshot();
        prop_assert_eq!(after.items(), before.items());
        let rows = stored(&repo);
        prop_assert_eq!(rows.as_slice(), before.items());
    }

    #[test]
    fn prop_create_then_remove_restores_catalog(count in 0..8usize) {
        let (rt, repo) = repo_with(count);
        let before = repo.snapshot();

        let created = rt
            .block_on(repo.create(common::name(&[("tr", "Geçici")]), false))
            .expect("create");
        prop_assert_eq!(created.order_index.get() as usize, count);
        rt.block_on(repo.remove(created.id)).expect("remove");

        let after = repo.snapshot();
        prop_assert_eq!(after.items(), before.items());
        prop_assert!(repo.snapshot().version() > before.version());
    }
}
