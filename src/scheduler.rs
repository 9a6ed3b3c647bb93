//! The round-robin scheduler (§3, §4.G): dispatches one quantum per ready
//! PCB, services page faults at frame boundaries, and reaps finished or
//! faulted scripts.

use crate::cpu::Fetch;
use crate::kernel::Kernel;
use crate::pcb::Pcb;
use crate::shell::interpreter;

#[derive(Debug, PartialEq, Eq)]
enum QuantumOutcome {
    Ok,
    EndOfFrame,
    Error,
}

/// Drains the ready queue, running each PCB for one quantum in turn until
/// none are left. `exec` is the only caller; it wipes RAM and the queue
/// again once this returns, so a script that faults here doesn't have to
/// clean up its own frames.
pub fn run(kernel: &mut Kernel) {
    while let Some(mut pcb) = kernel.ready_queue.dequeue() {
        let frame = match pcb.current_frame() {
            Some(f) => f,
            None => {
                log::warn!(
                    "pid {}: scheduled with no resident page at pc_page {}",
                    pcb.pid,
                    pcb.pc_page
                );
                // Dropped here, not requeued: release whatever frames it
                // still owns first, or they'd leak as occupied-but-ownerless
                // RAM slots that a later find_victim could hand out and
                // panic update_page_table's owner lookup on (§8 #1/#2).
                pcb.release_frames(&mut kernel.ram);
                continue;
            },
        };
        kernel.cpu.load_context(frame, pcb.pc_offset);

        match run_quantum(kernel) {
            QuantumOutcome::Error => {
                log::warn!(
                    "pid {}: invalid CPU state at ip={} offset={}, terminating",
                    pcb.pid,
                    kernel.cpu.ip,
                    kernel.cpu.offset
                );
                // Terminated: not requeued. Release its frames so they're
                // free for other live PCBs instead of lingering as
                // ownerless occupied frames (§4.C).
                pcb.release_frames(&mut kernel.ram);
            },
            QuantumOutcome::EndOfFrame => {
                pcb.pc_page += 1;
                pcb.pc_offset = 0;
                if pcb.pc_page > pcb.pages_max - 1 {
                    log::debug!("pid {}: finished", pcb.pid);
                    // Script ran off its last page: terminated.
                    pcb.release_frames(&mut kernel.ram);
                } else if pcb.current_frame().is_some() {
                    // The next page is already resident (it was part of the
                    // launcher's two-page preload) — nothing to fault in.
                    requeue(kernel, pcb);
                } else if let Err(e) = kernel.memory_manager.fault(
                    &mut kernel.ram,
                    &mut kernel.ready_queue,
                    &mut pcb,
                    pcb.pc_page,
                ) {
                    println!("{}", e);
                    // A failed fault mid-run empties the whole table, so
                    // there is nothing left worth requeuing.
                    kernel.ram.clear_all();
                    kernel.ready_queue.clear();
                    return;
                } else {
                    requeue(kernel, pcb);
                }
            },
            QuantumOutcome::Ok => {
                pcb.pc_offset = kernel.cpu.offset;
                if kernel.quit_executing_script {
                    kernel.quit_executing_script = false;
                    log::debug!("pid {}: quit from within its own script", pcb.pid);
                    // Terminated by its own `quit`: not requeued.
                    pcb.release_frames(&mut kernel.ram);
                } else {
                    requeue(kernel, pcb);
                }
            },
        }
    }
}

fn requeue(kernel: &mut Kernel, pcb: Pcb) {
    kernel.ready_queue.enqueue(pcb);
}

/// Dispatches instructions until the quantum elapses, the frame runs out, or
/// the running script quits itself.
fn run_quantum(kernel: &mut Kernel) -> QuantumOutcome {
    for _ in 0..kernel.cpu.quantum {
        match kernel.cpu.fetch(&kernel.ram) {
            Fetch::Error => return QuantumOutcome::Error,
            Fetch::EndOfFrame => return QuantumOutcome::EndOfFrame,
            Fetch::Instruction(line) => {
                kernel.cpu.ir = line.clone();
                interpreter::dispatch_line(kernel, &line);
                kernel.cpu.advance();
                if kernel.quit_executing_script {
                    return QuantumOutcome::Ok;
                }
            },
        }
    }
    QuantumOutcome::Ok
}
