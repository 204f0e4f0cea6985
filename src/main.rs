fn main() -> std::process::ExitCode {
    timesheet_guard_lib::run()
}
