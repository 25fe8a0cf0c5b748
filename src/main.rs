use zskip::BoundedDict;
use zskip::SkipList;

fn skip_list_demo() {
    let mut list = SkipList::new(10);
    list.insert(1, "1");
    list.insert(2, "2");
    list.insert(3, "3");
    print!("{}", list);

    list.delete_first();
    list.delete_last();
    print!("{}", list);
}

fn bounded_dict_demo() {
    let mut dict = BoundedDict::new();
    for i in 1..=5u64 {
        let evicted = dict.set_with_evict_front(i.to_string(), i, 3);
        if !evicted.is_empty() {
            eprintln!("set {}: evicted {:?}", i, evicted);
        }
    }
    print!("{}", dict);
    print!("{}", dict.list().dump_levels());
}

fn main() {
    skip_list_demo();
    bounded_dict_demo();
}
