use std::env;
use std::fs;
use std::process;

use mp4_box::boxes::emsg::EmsgBox;
use mp4_box::format_fourcc;
use mp4_box::reader::parse_mp4_boxes;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <mp4_file>", args[0]);
        process::exit(1);
    }

    run_file_mode(&args[1]);
}

fn run_file_mode(filename: &str) {
    let data = match fs::read(filename) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to read file '{}': {}", filename, e);
            process::exit(1);
        }
    };

    let boxes = match parse_mp4_boxes(&data) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to parse MP4 boxes: {}", e);
            process::exit(1);
        }
    };

    println!("Parsed {} top-level boxes from '{}':\n", boxes.len(), filename);
    for (i, mp4_box) in boxes.iter().enumerate() {
        println!(
            "Box {}: '{}' at offset {} ({} bytes)",
            i + 1,
            format_fourcc(&mp4_box.box_type),
            mp4_box.offset,
            mp4_box.size
        );

        if mp4_box.is(b"emsg") {
            match EmsgBox::parse_payload(mp4_box.payload) {
                Ok(emsg) => println!("{:#?}\n", emsg),
                Err(e) => eprintln!("Failed to decode emsg box: {}\n", e),
            }
        }
    }
}
